use tracing::Level as TraceLevel;
use tracing_subscriber::FmtSubscriber;

/// Map a level name to a tracing level; unknown names mean `info`
pub fn parse_level(name: &str) -> TraceLevel {
    match name.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// Install the global subscriber. `LOG_LEVEL` overrides `configured`,
/// an explicit `requested` level overrides both.
pub fn init(requested: Option<&str>, configured: &str) -> anyhow::Result<()> {
    let name = requested
        .map(str::to_string)
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| configured.to_string());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&name))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
