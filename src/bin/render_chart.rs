use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_charts::{
    ChartApp, DomainConfig, Error, FilterState, RefreshOutcome, Theme,
    headless::{FileSource, HeadlessPage},
};

/// Render an expense chart from a saved chart search response.
///
/// Prints the ECharts option object for the chart that the page would show.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File holding the JSON body of a `{prefix}/chart/search` response.
    #[arg(long)]
    input: PathBuf,

    /// Built-in domain to render.
    #[arg(long, value_enum, default_value_t = Domain::House, conflicts_with = "config")]
    domain: Domain,

    /// JSON file describing a custom domain.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Category filter. When set, amounts are grouped by day.
    #[arg(long = "type")]
    category: Option<String>,

    /// Year filter.
    #[arg(long)]
    year: Option<String>,

    /// Theme for the legend text.
    #[arg(long, value_enum, default_value_t = ThemeArg::Light)]
    theme: ThemeArg,

    /// Write the chart here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Domain {
    House,
    Car,
}

impl Domain {
    fn endpoint_prefix(self) -> &'static str {
        match self {
            Domain::House => "house",
            Domain::Car => "car",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let domain = match &args.config {
        Some(path) => DomainConfig::from_json_file(path)?,
        None => {
            let prefix = args.domain.endpoint_prefix();
            DomainConfig::builtin(prefix)
                .ok_or_else(|| Error::Config(format!("unknown expense domain \"{prefix}\"")))?
        }
    };

    let filters = FilterState {
        category: args.category,
        year: args.year,
    };
    let page = HeadlessPage::new(filters, args.theme.into());
    let app = ChartApp::new(domain, FileSource::new(&args.input));

    app.start(&page, || ())?;

    match app.refresh(&page).await {
        RefreshOutcome::Populated(points) => tracing::info!("Rendered {points} points."),
        RefreshOutcome::Empty => tracing::info!("The search has no results."),
        RefreshOutcome::Skipped | RefreshOutcome::Failed => {
            return Err(Error::Fetch(format!(
                "could not render {}",
                args.input.display()
            )));
        }
    }

    // The chart is drawn when it is created, so there is always a frame.
    let frame = page.last_frame().unwrap_or_default();

    write_frame(args.output.as_deref(), &frame)
}

fn write_frame(output: Option<&Path>, frame: &str) -> Result<(), Error> {
    match output {
        Some(path) => fs::write(path, frame).map_err(|error| Error::Io {
            path: path.display().to_string(),
            reason: error.to_string(),
        }),
        None => {
            println!("{frame}");
            Ok(())
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use expense_charts::{DomainConfig, Error};

    use crate::{Domain, write_frame};

    #[test]
    fn every_domain_option_is_builtin() {
        for domain in [Domain::House, Domain::Car] {
            let config = DomainConfig::builtin(domain.endpoint_prefix()).unwrap();

            assert_eq!(config.endpoint_prefix, domain.endpoint_prefix());
        }
    }

    #[test]
    fn unwritable_output_is_io_error() {
        let path = Path::new("/definitely/not/here/chart.json");

        let result = write_frame(Some(path), "{}");

        assert!(matches!(
            result,
            Err(Error::Io { path: failed, .. }) if failed == path.display().to_string()
        ));
    }

    #[test]
    fn writes_frame_to_output() {
        let path = std::env::temp_dir().join("expense_charts_render_chart_test.json");

        write_frame(Some(&path), "{\"series\": []}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"series\": []}");
        std::fs::remove_file(&path).unwrap();
    }
}
