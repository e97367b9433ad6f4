use predictor::align::Record;
use predictor::artifact;
use predictor::dataset::{Table, Value};
use predictor::encoding::EncoderTable;
use predictor::error::Error;
use predictor::forest::RandomForest;
use predictor::pipeline::cgpa::{self, CgpaPredictor};
use predictor::pipeline::exam::{self, ExamPredictor};
use predictor::TrainOptions;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("predictor-test-{}-{}", std::process::id(), name))
}

/// Generate a merged exam dataset with every known feature column.
fn exam_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 3.0).unwrap();
    let mut text = exam::FEATURES.join(",");
    text += ",FinalGrade,ExamScore\n";

    for _ in 0..rows {
        let hours: u32 = rng.gen_range(5..45);
        let attendance: u32 = rng.gen_range(60..101);
        let completion: u32 = rng.gen_range(50..101);
        let courses: u32 = rng.gen_range(0..10);
        let flags: Vec<u32> = (0..4).map(|_| rng.gen_range(0..2)).collect();
        let resources: u32 = rng.gen_range(0..3);
        let stress: u32 = rng.gen_range(0..3);
        let gender: u32 = rng.gen_range(0..2);
        let age: u32 = rng.gen_range(18..30);
        let style: u32 = rng.gen_range(0..4);
        let motivation: u32 = rng.gen_range(0..3);

        let score = 20.0
            + 0.8 * hours as f64
            + 0.3 * attendance as f64
            + 0.1 * completion as f64
            + 3.0 * motivation as f64
            - 2.0 * stress as f64
            + noise.sample(&mut rng);
        let score = score.clamp(0.0, 100.0);
        let grade = (score / 25.0).floor();

        text += &format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.2}\n",
            hours,
            attendance,
            completion,
            courses,
            flags[0],
            flags[1],
            resources,
            flags[2],
            flags[3],
            stress,
            gender,
            age,
            style,
            motivation,
            grade,
            score
        );
    }
    text
}

/// Generate a survey with categorical and numeric columns and a CGPA.
fn survey_csv(rows: usize, seed: u64) -> String {
    let majors = ["Engineering", "Medicine", "Arts", "Law"];
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.1).unwrap();
    let mut text = String::from("Gender,Major,StudyHours,Scholarship,CGPA\n");

    for _ in 0..rows {
        let gender = if rng.gen_bool(0.5) { "Male" } else { "Female" };
        let major = majors[rng.gen_range(0..majors.len())];
        let hours: u32 = rng.gen_range(0..30);
        let scholarship = rng.gen_bool(0.3);
        let cgpa = 1.5
            + 0.07 * hours as f64
            + if scholarship { 0.4 } else { 0.0 }
            + noise.sample(&mut rng);
        let cgpa = cgpa.clamp(0.0, 4.0);
        let scholarship = if scholarship { "Yes" } else { "No" };
        text += &format!(
            "{},{},{},{},{:.2}\n",
            gender, major, hours, scholarship, cgpa
        );
    }
    text
}

fn example_record() -> Record {
    let mut record = Record::new();
    let values = [
        ("StudyHours", 20.0),
        ("Attendance", 95.0),
        ("AssignmentCompletion", 90.0),
        ("OnlineCourses", 2.0),
        ("Discussions", 1.0),
        ("Extracurricular", 0.0),
        ("Resources", 2.0),
        ("Internet", 1.0),
        ("EduTech", 1.0),
        ("StressLevel", 1.0),
        ("Gender", 0.0),
        ("Age", 20.0),
        ("LearningStyle", 0.0),
        ("Motivation", 2.0),
    ];
    for (name, val) in values {
        record.insert(name, Value::Number(val));
    }
    record
}

#[test]
fn test_exam_pipeline_end_to_end() {
    let data = temp_path("exam.csv");
    let model = temp_path("exam.rfm");
    std::fs::write(&data, exam_csv(200, 1)).unwrap();

    let table = Table::load_csv(&data).unwrap();
    let config = exam::default_config();
    let opts = TrainOptions::new(30, 42);
    let (forest, report) = exam::train(&table, &config, &opts).unwrap();
    assert_eq!(report.train_rows, 160);
    assert_eq!(report.test_rows, 40);
    assert!(report.train_r2 > report.test_r2);
    assert!(report.test_r2 > 0.3, "test r2 {}", report.test_r2);
    assert_eq!(forest.feature_names(), &exam::FEATURES);

    artifact::save(&forest, &model).unwrap();
    let predictor = ExamPredictor::open(&data, &model, &config).unwrap();
    assert_eq!(predictor.forest(), &forest);

    let pred = predictor.predict(&example_record()).unwrap();
    assert!((0.0..=100.0).contains(&pred.raw), "score {}", pred.raw);
    assert_eq!(pred.assessment.score, (pred.raw * 100.0).round() / 100.0);

    // A partial record is imputed and still predicts.
    let partial = Record::new().with("StudyHours", Value::Number(40.0));
    assert!(predictor.predict(&partial).is_ok());

    std::fs::remove_file(&data).unwrap();
    std::fs::remove_file(&model).unwrap();
}

#[test]
fn test_training_is_reproducible() {
    let table = Table::parse(&exam_csv(120, 2), ',').unwrap();
    let config = exam::default_config();
    let opts = TrainOptions::new(15, 42);
    let (a, report_a) = exam::train(&table, &config, &opts).unwrap();
    let (b, report_b) = exam::train(&table, &config, &opts).unwrap();
    assert_eq!(a, b);
    assert_eq!(report_a, report_b);

    let pa = ExamPredictor::new(&table, &config, a).unwrap();
    let pb = ExamPredictor::new(&table, &config, b).unwrap();
    let record = example_record();
    assert_eq!(pa.predict(&record).unwrap(), pb.predict(&record).unwrap());
}

#[test]
fn test_exam_errors() {
    let table = Table::parse(&exam_csv(50, 3), ',').unwrap();
    let config = exam::default_config();
    let (forest, _) =
        exam::train(&table, &config, &TrainOptions::new(5, 42)).unwrap();
    let predictor = ExamPredictor::new(&table, &config, forest).unwrap();

    let mut record = example_record();
    record.insert("Gender", Value::Category("Male".into()));
    assert!(matches!(
        predictor.predict(&record),
        Err(Error::InvalidValue { .. })
    ));

    let mut record = example_record();
    record.insert("ExamScore", Value::Number(88.0));
    assert!(matches!(
        predictor.predict(&record),
        Err(Error::SchemaMismatch(_))
    ));

    // The predictor keeps working after failed requests.
    assert!(predictor.predict(&example_record()).is_ok());

    let missing_target = exam::default_config();
    let no_target = table.drop_columns(&["ExamScore"]).unwrap();
    let res = exam::train(&no_target, &missing_target, &TrainOptions::default());
    assert!(matches!(res, Err(Error::MissingColumn(_))));
}

#[test]
fn test_exam_dataset_needs_every_feature() {
    let table = Table::parse(&exam_csv(60, 6), ',').unwrap();
    let config = exam::default_config();
    let opts = TrainOptions::new(5, 42);
    let (forest, _) = exam::train(&table, &config, &opts).unwrap();

    let partial = table.drop_columns(&["Motivation"]).unwrap();
    let res = exam::train(&partial, &config, &opts);
    assert!(matches!(res, Err(Error::MissingColumn(name)) if name == "Motivation"));

    let res = ExamPredictor::new(&partial, &config, forest);
    assert!(matches!(res, Err(Error::MissingColumn(name)) if name == "Motivation"));
}

#[test]
fn test_cgpa_pipeline_end_to_end() {
    let data = temp_path("survey.csv");
    let model = temp_path("cgpa.rfm");
    let encoders_path = temp_path("cgpa.lenc");
    std::fs::write(&data, survey_csv(150, 4)).unwrap();

    let table = Table::load_csv(&data).unwrap();
    let config = cgpa::default_config();
    let opts = TrainOptions::new(25, 42);
    let (forest, encoders, report) = cgpa::train(&table, &config, &opts).unwrap();
    assert_eq!(report.test_rows, 30);
    assert_eq!(
        encoders.column_names().collect::<Vec<_>>(),
        ["Gender", "Major", "Scholarship"]
    );

    artifact::save(&forest, &model).unwrap();
    artifact::save(&encoders, &encoders_path).unwrap();
    let loaded: EncoderTable = artifact::load(&encoders_path).unwrap();
    assert_eq!(loaded, encoders);
    let loaded: RandomForest = artifact::load(&model).unwrap();
    assert_eq!(loaded, forest);

    let predictor =
        CgpaPredictor::open(&data, &model, &encoders_path, &config).unwrap();
    let record = Record::new()
        .with("Gender", Value::Category("Female".into()))
        .with("Major", Value::Category("Law".into()))
        .with("StudyHours", Value::Number(28.0))
        .with("Scholarship", Value::Category("Yes".into()));
    let pred = predictor.predict(&record).unwrap();
    assert!((0.0..=4.0).contains(&pred.cgpa), "cgpa {}", pred.cgpa);
    assert!((pred.percentage - pred.cgpa * 25.0).abs() < 1e-9);

    let low = Record::new()
        .with("StudyHours", Value::Number(0.0))
        .with("Scholarship", Value::Category("No".into()));
    let low = predictor.predict(&low).unwrap();
    assert!(low.cgpa < pred.cgpa);

    let unseen = Record::new().with("Major", Value::Category("Music".into()));
    assert!(matches!(
        predictor.predict(&unseen),
        Err(Error::UnseenCategory { .. })
    ));

    std::fs::remove_file(&data).unwrap();
    std::fs::remove_file(&model).unwrap();
    std::fs::remove_file(&encoders_path).unwrap();
}

#[test]
fn test_cgpa_training_is_reproducible() {
    let table = Table::parse(&survey_csv(100, 7), ',').unwrap();
    let config = cgpa::default_config();
    let opts = TrainOptions::new(12, 42);
    let (forest_a, enc_a, report_a) = cgpa::train(&table, &config, &opts).unwrap();
    let (forest_b, enc_b, report_b) = cgpa::train(&table, &config, &opts).unwrap();
    assert_eq!(forest_a, forest_b);
    assert_eq!(enc_a, enc_b);
    assert_eq!(report_a, report_b);

    let pa = CgpaPredictor::new(&table, &config, forest_a, enc_a).unwrap();
    let pb = CgpaPredictor::new(&table, &config, forest_b, enc_b).unwrap();
    let record = Record::new()
        .with("Major", Value::Category("Medicine".into()))
        .with("StudyHours", Value::Number(12.0));
    assert_eq!(pa.predict(&record).unwrap(), pb.predict(&record).unwrap());
}

#[test]
fn test_quoted_csv_fields() {
    let mut text = String::from("Major,StudyHours,CGPA\n");
    for i in 0..20 {
        let major = if i % 2 == 0 { "\"Computer\nScience\"" } else { "Art" };
        text += &format!("{},{},{:.2}\n", major, i, 2.0 + 0.05 * i as f64);
    }
    let table = Table::parse(&text, ',').unwrap();
    assert_eq!(table.rows(), 20);

    let config = cgpa::default_config();
    let opts = TrainOptions::new(4, 42);
    let (_, encoders, _) = cgpa::train(&table, &config, &opts).unwrap();
    let classes = encoders.get("Major").unwrap().classes();
    assert_eq!(classes, &["Art", "Computer\nScience"]);
}

#[test]
fn test_corrupt_model_is_rejected() {
    let data = temp_path("corrupt.csv");
    let model = temp_path("corrupt.rfm");
    std::fs::write(&data, exam_csv(30, 5)).unwrap();
    std::fs::write(&model, b"not a model").unwrap();

    let res = ExamPredictor::open(&data, &model, &exam::default_config());
    assert!(matches!(res, Err(Error::CorruptArtifact(_))));

    std::fs::remove_file(&data).unwrap();
    std::fs::remove_file(&model).unwrap();
}
