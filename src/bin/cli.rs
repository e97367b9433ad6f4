//! This is the command line tool that trains the exam and CGPA models, and
//! predicts the performance of a student from a record of attributes.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use predictor::align::Record;
use predictor::dataset::Table;
use predictor::error::{Error, Result};
use predictor::form::{FieldKind, FieldSpec, FormSpec, Phrase};
use predictor::label::{Assessment, Language};
use predictor::pipeline::cgpa::{self, CgpaPredictor};
use predictor::pipeline::exam::{self, ExamPredictor};
use predictor::pipeline::PipelineConfig;
use predictor::{artifact, TrainOptions};

use std::io::{self, BufRead, Write};
use std::time::Instant;

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipeline {
    Exam,
    Cgpa,
}

/// A loaded predictor of either pipeline.
enum Service {
    Exam(ExamPredictor),
    Cgpa(CgpaPredictor),
}

impl Service {
    fn form(&self) -> &FormSpec {
        match self {
            Service::Exam(p) => p.form(),
            Service::Cgpa(p) => p.form(),
        }
    }

    /// Predict 'record' and render the result in 'lang'.
    fn predict(&self, record: &Record, lang: Language) -> Result<String> {
        match self {
            Service::Exam(p) => {
                let pred = p.predict(record)?;
                let score = format!(
                    "{}: {:.2} {}",
                    Phrase::ExamScore.text(lang),
                    pred.assessment.score,
                    Phrase::OutOf100.text(lang)
                );
                Ok(render(&score, &pred.assessment, lang))
            }
            Service::Cgpa(p) => {
                let pred = p.predict(record)?;
                let score =
                    format!("CGPA: {:.2} ({:.2}%)", pred.cgpa, pred.percentage);
                Ok(render(&score, &pred.assessment, lang))
            }
        }
    }
}

fn render(score: &str, assessment: &Assessment, lang: Language) -> String {
    format!(
        "{}\n{}: {}\n{}: {}",
        score,
        Phrase::Level.text(lang),
        assessment.level.name(lang),
        Phrase::Status.text(lang),
        assessment.status.name(lang)
    )
}

fn pipeline_args() -> [Arg; 4] {
    [
        Arg::new("pipeline")
            .long("pipeline")
            .value_name("NAME")
            .help("The model to use")
            .value_parser(["exam", "cgpa"])
            .required(true)
            .num_args(1),
        Arg::new("data")
            .long("data")
            .value_name("FILE")
            .help("Path of the dataset")
            .required(true)
            .num_args(1),
        Arg::new("target")
            .long("target")
            .value_name("COL")
            .help("Overrides the target column")
            .num_args(1),
        Arg::new("drop")
            .long("drop")
            .value_name("COL")
            .help("A column that is not a feature (repeatable)")
            .action(ArgAction::Append),
    ]
}

fn artifact_args() -> [Arg; 2] {
    [
        Arg::new("model")
            .long("model")
            .value_name("FILE")
            .help("Path of the model file")
            .num_args(1),
        Arg::new("encoders")
            .long("encoders")
            .value_name("FILE")
            .help("Path of the encoder table (cgpa only)")
            .num_args(1),
    ]
}

fn lang_arg() -> Arg {
    Arg::new("lang")
        .long("lang")
        .value_name("LANG")
        .help("The display language")
        .value_parser(["en", "ku"])
        .num_args(1)
}

fn get_pipeline(matches: &ArgMatches) -> Pipeline {
    match matches.get_one::<String>("pipeline").map(String::as_str) {
        Some("cgpa") => Pipeline::Cgpa,
        _ => Pipeline::Exam,
    }
}

fn get_config(matches: &ArgMatches, pipeline: Pipeline) -> PipelineConfig {
    let mut config = match pipeline {
        Pipeline::Exam => exam::default_config(),
        Pipeline::Cgpa => cgpa::default_config(),
    };
    if let Some(target) = matches.get_one::<String>("target") {
        config.target = target.clone();
    }
    if let Some(dropped) = matches.get_many::<String>("drop") {
        config.excluded = dropped.cloned().collect();
    }
    config
}

fn get_lang(matches: &ArgMatches) -> Language {
    matches
        .get_one::<String>("lang")
        .and_then(|code| Language::from_code(code))
        .unwrap_or_default()
}

fn get_path(matches: &ArgMatches, name: &str, default: &str) -> String {
    matches
        .get_one::<String>(name)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn get_data(matches: &ArgMatches) -> String {
    get_path(matches, "data", "")
}

fn train(matches: &ArgMatches) -> Result<()> {
    let pipeline = get_pipeline(matches);
    let config = get_config(matches, pipeline);
    let mut opts = TrainOptions::default();
    if let Some(trees) = matches.get_one::<usize>("trees") {
        opts.trees = *trees;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        opts.seed = *seed;
    }

    let table = Table::load_csv(get_data(matches))?;
    match pipeline {
        Pipeline::Exam => {
            let (forest, report) = exam::train(&table, &config, &opts)?;
            let model = get_path(matches, "model", exam::MODEL_FILE);
            artifact::save(&forest, model)?;
            println!("{}", report);
        }
        Pipeline::Cgpa => {
            let (forest, encoders, report) =
                cgpa::train(&table, &config, &opts)?;
            let model = get_path(matches, "model", cgpa::MODEL_FILE);
            let enc = get_path(matches, "encoders", cgpa::ENCODERS_FILE);
            artifact::save(&forest, model)?;
            artifact::save(&encoders, enc)?;
            println!("{}", report);
        }
    }
    Ok(())
}

fn open_service(matches: &ArgMatches) -> Result<Service> {
    let pipeline = get_pipeline(matches);
    let config = get_config(matches, pipeline);
    let data = get_data(matches);
    match pipeline {
        Pipeline::Exam => {
            let model = get_path(matches, "model", exam::MODEL_FILE);
            let p = ExamPredictor::open(data, model, &config)?;
            Ok(Service::Exam(p))
        }
        Pipeline::Cgpa => {
            let model = get_path(matches, "model", cgpa::MODEL_FILE);
            let enc = get_path(matches, "encoders", cgpa::ENCODERS_FILE);
            let p = CgpaPredictor::open(data, model, enc, &config)?;
            Ok(Service::Cgpa(p))
        }
    }
}

/// Render the options of a choice field, or the bounds of a number field.
fn describe_field(field: &FieldSpec, lang: Language) -> String {
    match field.kind() {
        FieldKind::Number { min, max, default } => {
            format!("[{} - {}] ({})", min, max, default)
        }
        FieldKind::Choice { options } => {
            let labels: Vec<String> = options
                .iter()
                .map(|opt| format!("{}={}", opt, field.option_label(opt, lang)))
                .collect();
            format!("[{}]", labels.join(", "))
        }
    }
}

fn show_form(matches: &ArgMatches) -> Result<()> {
    let pipeline = get_pipeline(matches);
    let config = get_config(matches, pipeline);
    let lang = get_lang(matches);
    let table = Table::load_csv(get_data(matches))?;
    let (features, _) = config.schema(&table)?;
    let form = FormSpec::from_table(&features);
    for field in form.fields() {
        println!(
            "{:<22} {} {}",
            field.name(),
            field.caption(lang),
            describe_field(field, lang)
        );
    }
    Ok(())
}

/// Prompt for every field of 'form'. Returns None when the input ends.
fn read_record(form: &FormSpec, lang: Language) -> Option<Record> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut record = Record::new();
    for field in form.fields() {
        let default = field.default_value();
        print!("{} {} ", field.caption(lang), describe_field(field, lang));
        if let Some(val) = &default {
            print!("<{}> ", val);
        }
        io::stdout().flush().ok()?;

        let line = lines.next()?.ok()?;
        let line = line.trim();
        if line == "q" {
            return None;
        }
        if line.is_empty() {
            record.insert(field.name(), default?);
        } else {
            record.insert_text(field.name(), line);
        }
    }
    Some(record)
}

fn check_and_predict(
    service: &Service,
    record: &Record,
    lang: Language,
) -> Result<String> {
    service.form().check(record)?;
    service.predict(record, lang)
}

fn predict(matches: &ArgMatches) -> Result<()> {
    let lang = get_lang(matches);
    let service = open_service(matches)?;

    if matches.get_flag("interactive") {
        while let Some(record) = read_record(service.form(), lang) {
            match check_and_predict(&service, &record, lang) {
                Ok(text) => println!("{}\n", text),
                Err(err) => {
                    println!("{}\n{}\n", Phrase::CheckFields.text(lang), err)
                }
            }
        }
        return Ok(());
    }

    let mut record = Record::new();
    if let Some(assignments) = matches.get_many::<String>("set") {
        for text in assignments {
            record.insert_assignment(text)?;
        }
    }
    match check_and_predict(&service, &record, lang) {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", Phrase::CheckFields.text(lang));
            Err(err)
        }
    }
}

fn main() {
    let matches = Command::new("CLI")
        .version("1.x")
        .subcommand_required(true)
        .subcommand(
            Command::new("train")
                .about("Train a model and save it")
                .args(pipeline_args())
                .args(artifact_args())
                .arg(
                    Arg::new("trees")
                        .long("trees")
                        .value_name("N")
                        .help("The number of trees")
                        .value_parser(value_parser!(usize))
                        .num_args(1),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("N")
                        .help("Seeds the split and the forest")
                        .value_parser(value_parser!(u64))
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict the performance of a student")
                .args(pipeline_args())
                .args(artifact_args())
                .arg(lang_arg())
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("NAME=VALUE")
                        .help("A feature value (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("interactive")
                        .short('i')
                        .long("interactive")
                        .help("Prompt for the features")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("set"),
                ),
        )
        .subcommand(
            Command::new("form")
                .about("Print the input form of a pipeline")
                .args(pipeline_args())
                .arg(lang_arg()),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let timer = Timer::new();
    let res = match matches.subcommand() {
        Some(("train", sub)) => train(sub),
        Some(("predict", sub)) => predict(sub),
        Some(("form", sub)) => show_form(sub),
        _ => Err(Error::SchemaMismatch("unknown command".into())),
    };
    drop(timer);

    if let Err(err) = res {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
