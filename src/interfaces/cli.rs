use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::application::{BulkSheetGenerator, SurveyPlan};
use crate::domain::error::{AppError, Result};
use crate::domain::survey::{BulkSheet, NegativeAsinScope, OutputLocale};
use crate::infrastructure::bulksheet_writer::{BulkSheetWriter, OutputFormat};
use crate::infrastructure::config::{ConfigService, Settings};
use crate::infrastructure::survey::{CsvSurveyParser, SurveyReader};
use crate::interfaces::http;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LocaleArg {
    En,
    Zh,
}

impl From<LocaleArg> for OutputLocale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::En => OutputLocale::En,
            LocaleArg::Zh => OutputLocale::Zh,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum NegativeAsinArg {
    ProductTarget,
    AllCampaigns,
}

impl From<NegativeAsinArg> for NegativeAsinScope {
    fn from(arg: NegativeAsinArg) -> Self {
        match arg {
            NegativeAsinArg::ProductTarget => NegativeAsinScope::ProductTarget,
            NegativeAsinArg::AllCampaigns => NegativeAsinScope::AllCampaigns,
        }
    }
}

/// Turn a campaign survey spreadsheet into a Sponsored Products bulk upload sheet.
#[derive(Parser, Debug)]
#[command(name = "bulksheet", version)]
pub struct Cli {
    /// Settings file (TOML). Defaults to ./bulksheet.toml when present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the bulk sheet and write it to a file.
    Convert(ConvertArgs),

    /// Validate a survey and print what would be generated, without writing anything.
    Check(CheckArgs),

    /// Serve the upload/download HTTP API.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Survey workbook or CSV.
    pub input: PathBuf,

    /// Output path. Defaults to `<input-stem>-bulk.<format>` next to the input.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format. Inferred from `--output` when omitted.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Header and literal vocabulary of the generated sheet.
    #[arg(long, value_enum)]
    pub locale: Option<LocaleArg>,

    /// Which campaigns receive negative product-targeting rows.
    #[arg(long = "negative-asin", value_enum)]
    pub negative_asin: Option<NegativeAsinArg>,

    /// Minimum character length of a category taken from an ASIN header.
    #[arg(long)]
    pub min_category_len: Option<usize>,

    /// Field delimiter of a CSV survey. Detected from the content when omitted.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Print the generation summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Survey workbook or CSV.
    pub input: PathBuf,

    /// Field delimiter of a CSV survey. Detected from the content when omitted.
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

pub fn execute(cli: Cli) -> Result<ExitCode> {
    let settings = ConfigService::load(cli.config.as_deref())?;

    match cli.command {
        Command::Convert(args) => convert(settings, args),
        Command::Check(args) => check(settings, args),
        Command::Serve(args) => serve(settings, args),
    }
}

fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("survey");
    input.with_file_name(format!("{}-bulk.{}", stem, format.extension()))
}

/// Survey reader honouring an explicit CSV delimiter
fn survey_reader(delimiter: Option<char>) -> Result<SurveyReader> {
    let Some(delimiter) = delimiter else {
        return Ok(SurveyReader::new());
    };
    let byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "Delimiter must be an ASCII character: {:?}",
                delimiter
            ))
        })?;
    Ok(SurveyReader::new().with_csv_parser(CsvSurveyParser::new().with_delimiter(byte)))
}

fn convert(mut settings: Settings, args: ConvertArgs) -> Result<ExitCode> {
    let generation = &mut settings.generation;
    if let Some(locale) = args.locale {
        generation.locale = locale.into();
    }
    if let Some(scope) = args.negative_asin {
        generation.negative_asin_scope = scope.into();
    }
    if let Some(min_len) = args.min_category_len {
        generation.min_category_len = min_len;
    }

    let format = match (args.format, &args.output) {
        (Some(format), _) => format.into(),
        (None, Some(output)) => OutputFormat::from_path(output),
        (None, None) => OutputFormat::default(),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, format));

    let generator = BulkSheetGenerator::new(settings.generation)?;
    let table = survey_reader(args.delimiter)?.read_path(&args.input)?;
    let sheet = generator.generate(&table)?;

    BulkSheetWriter::new(format).write_to_path(&sheet, &output)?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let summary = serde_json::to_string_pretty(&sheet.summary)
            .map_err(|e| AppError::Internal(format!("Failed to serialize summary: {}", e)))?;
        writeln!(stdout, "{}", summary)?;
    } else {
        print_summary(&mut stdout, &sheet, &output)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(out: &mut impl Write, sheet: &BulkSheet, output: &Path) -> std::io::Result<()> {
    let summary = &sheet.summary;
    writeln!(out, "Wrote {} rows to {}", sheet.rows.len(), output.display())?;
    writeln!(out, "Campaigns: {}", summary.campaign_count)?;
    writeln!(out, "Categories: {}", summary.categories.join(", "))?;

    for plan in &summary.plans {
        writeln!(
            out,
            "  {}  category={} match={} keywords={} negatives={}/{} targets={} negative-targets={}",
            plan.name,
            plan.classification.category.as_deref().unwrap_or("-"),
            plan.classification.match_type,
            plan.keywords,
            plan.negative_exact,
            plan.negative_phrase,
            plan.product_targets,
            plan.negative_product_targets,
        )?;
    }

    for (level, count) in &summary.rows_per_entity {
        writeln!(out, "  {:?}: {}", level, count)?;
    }
    for warning in &summary.warnings {
        writeln!(out, "warning: {}", warning)?;
    }
    Ok(())
}

fn check(settings: Settings, args: CheckArgs) -> Result<ExitCode> {
    let generator = BulkSheetGenerator::new(settings.generation)?;
    let table = survey_reader(args.delimiter)?.read_path(&args.input)?;
    let plan = generator.plan(&table)?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let json = serde_json::to_string_pretty(&plan)
            .map_err(|e| AppError::Internal(format!("Failed to serialize plan: {}", e)))?;
        writeln!(stdout, "{}", json)?;
    } else {
        print_plan(&mut stdout, &plan)?;
    }

    if plan.duplicates.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_plan(out: &mut impl Write, plan: &SurveyPlan) -> std::io::Result<()> {
    writeln!(out, "Campaigns: {}", plan.campaigns.len())?;
    writeln!(out, "Categories: {}", plan.categories.join(", "))?;
    for planned in &plan.campaigns {
        writeln!(
            out,
            "  {}  category={} match={}",
            planned.campaign.name,
            planned.classification.category.as_deref().unwrap_or("-"),
            planned.classification.match_type,
        )?;
    }
    for warning in &plan.warnings {
        writeln!(out, "warning: {}", warning)?;
    }
    if plan.duplicates.is_empty() {
        writeln!(out, "No duplicate keywords")?;
    } else {
        writeln!(out, "Duplicate keywords: {}", plan.duplicates)?;
    }
    Ok(())
}

fn serve(mut settings: Settings, args: ServeArgs) -> Result<ExitCode> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    info!(
        host = %settings.server.host,
        port = settings.server.port,
        "Starting HTTP server"
    );

    let logs = Arc::new(Mutex::new(Vec::new()));
    actix_web::rt::System::new().block_on(async move {
        let server = http::start_server(settings, logs)?;
        server.await
    })?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from([
            "bulksheet",
            "convert",
            "survey.xlsx",
            "--format",
            "csv",
            "--locale",
            "zh",
            "--negative-asin",
            "all-campaigns",
            "--min-category-len",
            "1",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.input, PathBuf::from("survey.xlsx"));
                assert!(matches!(args.format, Some(FormatArg::Csv)));
                assert!(matches!(args.locale, Some(LocaleArg::Zh)));
                assert!(matches!(args.negative_asin, Some(NegativeAsinArg::AllCampaigns)));
                assert_eq!(args.min_category_len, Some(1));
                assert!(!args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let dir = std::env::temp_dir().join(format!("bulksheet-delim-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("survey.csv");
        // commas inside values outnumber the real ';' separator
        std::fs::write(
            &input,
            "广告活动名称;备注,a,b\nHost-Exact-EU;x,y,z\nCase Broad US;p,q,r\n",
        )
        .unwrap();

        let detected = survey_reader(None).unwrap().read_path(&input).unwrap();
        assert_eq!(detected.header(0), Some("广告活动名称;备注"));

        let explicit = survey_reader(Some(';')).unwrap().read_path(&input).unwrap();
        assert_eq!(explicit.header(0), Some("广告活动名称"));
        assert_eq!(explicit.cell(1, 0), Some("Case Broad US"));
        assert_eq!(explicit.cell(0, 1), Some("x,y,z"));

        let args = CheckArgs {
            input,
            delimiter: Some(';'),
            json: true,
        };
        assert!(check(Settings::default(), args).is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_ascii_delimiter_is_rejected() {
        assert!(matches!(
            survey_reader(Some('，')),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_check_delimiter() {
        let cli = Cli::parse_from(["bulksheet", "check", "survey.csv", "--delimiter", ";"]);
        match cli.command {
            Command::Check(args) => assert_eq!(args.delimiter, Some(';')),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/survey.xlsx"), OutputFormat::Xlsx),
            PathBuf::from("/data/survey-bulk.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("survey.csv"), OutputFormat::Csv),
            PathBuf::from("survey-bulk.csv")
        );
    }

    #[test]
    fn test_convert_writes_output_file() {
        let dir = std::env::temp_dir().join(format!("bulksheet-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("survey.csv");
        std::fs::write(
            &input,
            "广告活动名称,CPC,SKU,广告组默认竞价,预算,备注,国家,host精准\n\
             Host-Exact-EU,0.7,SKU-H,0.8,20,,,usb hub\n",
        )
        .unwrap();

        let args = ConvertArgs {
            input: input.clone(),
            output: None,
            format: Some(FormatArg::Csv),
            locale: None,
            negative_asin: None,
            min_category_len: None,
            delimiter: None,
            json: true,
        };
        convert(Settings::default(), args).unwrap();

        let written = std::fs::read_to_string(dir.join("survey-bulk.csv")).unwrap();
        assert!(written.contains("usb hub"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_convert_refuses_duplicates() {
        let dir = std::env::temp_dir().join(format!("bulksheet-dup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("survey.csv");
        std::fs::write(
            &input,
            "广告活动名称,CPC,SKU,广告组默认竞价,预算,备注,国家,host精准\n\
             Host-Exact-EU,0.7,SKU-H,0.8,20,,,usb hub\n\
             Host-Broad-EU,0.7,SKU-H,0.8,20,,,usb hub\n",
        )
        .unwrap();

        let args = ConvertArgs {
            input,
            output: None,
            format: None,
            locale: None,
            negative_asin: None,
            min_category_len: None,
            delimiter: None,
            json: false,
        };
        let result = convert(Settings::default(), args);
        assert!(matches!(result, Err(AppError::DuplicateKeywords(_))));
        assert!(!dir.join("survey-bulk.xlsx").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
