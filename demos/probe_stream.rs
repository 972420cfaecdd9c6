use flvio::flv::StreamProbe;
use tokio::fs::File;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample.flv".to_string());

    println!("Probing {}", path);
    let file = File::open(&path).await?;
    let mut probe = StreamProbe::start(file).await?;
    println!(
        "Container: version {}, audio={} video={}",
        probe.header().version,
        probe.header().has_audio(),
        probe.header().has_video()
    );

    while let Some(arrival) = probe.next_arrival().await? {
        println!(
            "{:?} tag: {} bytes, stream time {}ms, arrived +{}ms (total {}ms)",
            arrival.tag.kind,
            arrival.tag.data.len(),
            arrival.tag.timestamp,
            arrival.interval.as_millis(),
            arrival.elapsed.as_millis()
        );
    }

    println!(
        "Probe finished: {} tags, {} bytes",
        probe.tag_count(),
        probe.byte_count()
    );
    Ok(())
}
