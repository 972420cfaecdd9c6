use async_trait::async_trait;
use bytes::Bytes;
use flvio::flv::{FlvSource, FlvWriter, TagKind};
use flvio::pump::{ConnectionStatus, PublishConfig, Publisher, SessionStatus, StreamSink};
use std::time::{Duration, Instant};

/// Prints every tag the pump hands over, stamped with the wall-clock
/// offset so the pacing is visible.
struct ConsoleSink {
    status: SessionStatus,
    started: Instant,
    published: u64,
}

#[async_trait]
impl StreamSink for ConsoleSink {
    fn connection_status(&self) -> ConnectionStatus {
        self.status.status()
    }

    fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    async fn publish(
        &mut self,
        kind: TagKind,
        data: Bytes,
        timestamp_delta: u32,
    ) -> flvio::Result<()> {
        self.published += 1;
        println!(
            "[{:>6}ms] {:?} tag, {} bytes, stream time {}ms",
            self.started.elapsed().as_millis(),
            kind,
            data.len(),
            timestamp_delta
        );
        Ok(())
    }
}

async fn write_sample_clip(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = FlvWriter::create(path).await?;
    for i in 0u32..25 {
        let kind = if i % 5 == 0 {
            TagKind::Video
        } else {
            TagKind::Audio
        };
        let payload = vec![0u8; if kind == TagKind::Video { 512 } else { 128 }];
        writer.write_tag(kind, &payload, i * 40).await?;
    }
    writer.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Publish the given file, or generate a one-second sample clip
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            println!("No input given, writing sample.flv...");
            write_sample_clip("sample.flv").await?;
            "sample.flv".to_string()
        }
    };

    println!("Opening {}", path);
    let source = FlvSource::open(&path).await?;
    println!(
        "Container flags: audio={} video={}",
        source.header().has_audio(),
        source.header().has_video()
    );

    let status = SessionStatus::new();
    status.set_status(ConnectionStatus::StreamReady);
    let sink = ConsoleSink {
        status,
        started: Instant::now(),
        published: 0,
    };

    // Loop the clip in real time for five seconds, then stop
    let config = PublishConfig::new().with_duration_budget(Duration::from_secs(5));
    let mut publisher = Publisher::new(source, sink).with_config(config);
    publisher.run().await?;

    println!(
        "Published {} tags over {} pass(es)",
        publisher.sink().published,
        publisher.source().passes() + 1
    );
    Ok(())
}
