use clap::Parser;
use detpost::io::letterbox_ratios_for_path;
use detpost::{
    Label, Labels, LetterboxRatios, NmsScope, OverlapMode, PostProcessor, PostprocessConfig,
    RawOutput, RenderBox, ScoreMode,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "detpost CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for each pipeline stage.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    Dense,
    Exported,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScoreModeConfig {
    ObjectnessTimesClass,
    ClassOnly,
}

impl From<ScoreModeConfig> for ScoreMode {
    fn from(value: ScoreModeConfig) -> Self {
        match value {
            ScoreModeConfig::ObjectnessTimesClass => ScoreMode::ObjectnessTimesClass,
            ScoreModeConfig::ClassOnly => ScoreMode::ClassOnly,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OverlapModeConfig {
    OwnArea,
    Iou,
}

impl From<OverlapModeConfig> for OverlapMode {
    fn from(value: OverlapModeConfig) -> Self {
        match value {
            OverlapModeConfig::OwnArea => OverlapMode::OwnArea,
            OverlapModeConfig::Iou => OverlapMode::Iou,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScopeConfig {
    ClassAgnostic,
    PerClass,
}

impl From<ScopeConfig> for NmsScope {
    fn from(value: ScopeConfig) -> Self {
        match value {
            ScopeConfig::ClassAgnostic => NmsScope::ClassAgnostic,
            ScopeConfig::PerClass => NmsScope::PerClass,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PostprocessConfigJson {
    confidence_threshold: f32,
    class_threshold: f32,
    overlap_threshold: f32,
    score_mode: ScoreModeConfig,
    overlap_mode: OverlapModeConfig,
    scope: ScopeConfig,
    max_detections: Option<usize>,
    parallel: bool,
}

impl Default for PostprocessConfigJson {
    fn default() -> Self {
        let cfg = PostprocessConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            class_threshold: cfg.class_threshold,
            overlap_threshold: cfg.overlap_threshold,
            score_mode: ScoreModeConfig::ObjectnessTimesClass,
            overlap_mode: OverlapModeConfig::OwnArea,
            scope: ScopeConfig::ClassAgnostic,
            max_detections: cfg.max_detections,
            parallel: cfg.parallel,
        }
    }
}

impl From<PostprocessConfigJson> for PostprocessConfig {
    fn from(value: PostprocessConfigJson) -> Self {
        Self {
            confidence_threshold: value.confidence_threshold,
            class_threshold: value.class_threshold,
            overlap_threshold: value.overlap_threshold,
            score_mode: value.score_mode.into(),
            overlap_mode: value.overlap_mode.into(),
            scope: value.scope.into(),
            max_detections: value.max_detections,
            parallel: value.parallel,
        }
    }
}

/// Letterbox source: an image on disk, explicit dimensions or explicit ratios.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LetterboxJson {
    image_path: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
    x_ratio: Option<f32>,
    y_ratio: Option<f32>,
}

impl LetterboxJson {
    fn resolve(&self) -> Result<LetterboxRatios, Box<dyn std::error::Error>> {
        if let Some(path) = &self.image_path {
            return Ok(letterbox_ratios_for_path(path)?);
        }
        match (self.width, self.height, self.x_ratio, self.y_ratio) {
            (Some(width), Some(height), None, None) => {
                Ok(LetterboxRatios::from_dims(width, height)?)
            }
            (None, None, Some(x_ratio), Some(y_ratio)) => {
                Ok(LetterboxRatios::new(x_ratio, y_ratio)?)
            }
            (None, None, None, None) => Ok(LetterboxRatios::IDENTITY),
            _ => Err("letterbox needs either width and height or x_ratio and y_ratio".into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    raw_output_path: String,
    layout: LayoutConfig,
    labels_path: Option<String>,
    output_path: Option<String>,
    letterbox: LetterboxJson,
    postprocess: PostprocessConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_output_path: String::new(),
            layout: LayoutConfig::Dense,
            labels_path: None,
            output_path: None,
            letterbox: LetterboxJson::default(),
            postprocess: PostprocessConfigJson::default(),
        }
    }
}

/// Raw tensor dump: `{"dims": [batch, rows, stride], "data": [...]}`.
#[derive(Debug, Deserialize)]
struct RawOutputJson {
    dims: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum LabelRecord {
    Name(String),
    Id(u32),
}

impl From<Label> for LabelRecord {
    fn from(value: Label) -> Self {
        match value {
            Label::Name(name) => LabelRecord::Name(name),
            Label::Id(id) => LabelRecord::Id(id),
        }
    }
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    label: LabelRecord,
    probability: f32,
    bounding: [f32; 4],
}

impl From<RenderBox> for BoxRecord {
    fn from(value: RenderBox) -> Self {
        Self {
            label: value.label.into(),
            probability: value.probability,
            bounding: value.bounding,
        }
    }
}

fn load_labels(path: Option<&str>) -> Result<Labels, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let names: Vec<String> = serde_json::from_str(&fs::read_to_string(path)?)?;
            Ok(Labels::new(names))
        }
        None => Ok(Labels::coco()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detpost=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.raw_output_path.is_empty() {
        return Err("raw_output_path must be set in the config".into());
    }

    let raw_text = fs::read_to_string(&config.raw_output_path)?;
    let raw_json: RawOutputJson = serde_json::from_str(&raw_text)?;
    let raw = RawOutput::new(raw_json.data, &raw_json.dims)?;

    let ratios = config.letterbox.resolve()?;
    let labels = load_labels(config.labels_path.as_deref())?;
    let processor = PostProcessor::new(config.postprocess.into())?;

    let selected = match config.layout {
        LayoutConfig::Dense => processor.run(raw.view(), ratios)?,
        LayoutConfig::Exported => processor.run_exported(raw.view(), ratios)?,
    };
    tracing::info!(boxes = selected.len(), "post-processing finished");

    let records: Vec<BoxRecord> = selected
        .iter()
        .map(|selected| BoxRecord::from(selected.to_render(&labels)))
        .collect();
    let json = serde_json::to_string_pretty(&records)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
