use proxy_probe::{
    outcome::{Outcome, ResultCollection},
    report::{OutputMode, Summary, render},
};

fn sample() -> ResultCollection {
    vec![
        Some(Outcome::succeeded("http://a:1", 200, 100)),
        Some(Outcome::failed("http://b:1")),
        Some(Outcome::succeeded("http://c:1", 200, 300)),
    ]
}

fn render_to_string(results: &[Option<Outcome>], mode: OutputMode) -> String {
    let mut buf = Vec::new();
    render(results, mode, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn plaintext_summary() {
    let out = render_to_string(&sample(), OutputMode::Plaintext);
    assert_eq!(out, "Success rate:      2/3\nAverage TTFB:      200ms\n");
}

#[test]
fn json_report_fields() {
    let out = render_to_string(&sample(), OutputMode::Json);
    assert!(!out.ends_with('\n'));
    assert!(out.starts_with(r#"{"Success":2,"Fail":1,"AverageTTFB":200,"Results":["#));

    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    let results = v["Results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["StatusCode"], 200);
    assert_eq!(results[0]["Latency"]["TTFB"], 100);
    assert_eq!(results[1]["StatusCode"], -1);
}

#[test]
fn yaml_report_fields() {
    let out = render_to_string(&sample(), OutputMode::Yaml);
    let v: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
    assert_eq!(v["Success"].as_u64(), Some(2));
    assert_eq!(v["Fail"].as_u64(), Some(1));
    assert_eq!(v["AverageTTFB"].as_i64(), Some(200));
    assert_eq!(v["Results"].as_sequence().map(|s| s.len()), Some(3));
}

#[test]
fn per_probe_error_surfaces_in_results() {
    let mut failed = Outcome::failed("http://b:1");
    failed.error = Some("connection refused".into());
    let results = vec![Some(failed)];

    let out = render_to_string(&results, OutputMode::Json);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["Results"][0]["Error"], "connection refused");

    let out = render_to_string(&results, OutputMode::Plaintext);
    assert_eq!(out, "Success rate:      0/1\nAverage TTFB:      0ms\n");
}

#[test]
fn empty_collection_in_every_mode() {
    for mode in [OutputMode::Plaintext, OutputMode::Json, OutputMode::Yaml] {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary, Summary::default());
        let out = render_to_string(&[], mode);
        assert!(!out.is_empty());
    }
    assert_eq!(
        render_to_string(&[], OutputMode::Plaintext),
        "Success rate:      0/0\nAverage TTFB:      0ms\n"
    );
    assert_eq!(
        render_to_string(&[], OutputMode::Json),
        r#"{"Success":0,"Fail":0,"AverageTTFB":0,"Results":[]}"#
    );
}

#[test]
fn nil_entries_are_not_counted() {
    let results = vec![None, Some(Outcome::succeeded("http://a:1", 204, 50)), None];
    let summary = Summary::from_results(&results);
    assert_eq!(summary.success, 1);
    assert_eq!(summary.fail, 0);
    assert_eq!(summary.average_ttfb_ms, 50);

    let out = render_to_string(&results, OutputMode::Json);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(v["Results"][0].is_null());
}

#[test]
fn only_failures_average_zero() {
    let results = vec![Some(Outcome::failed("x")), Some(Outcome::failed("y"))];
    let summary = Summary::from_results(&results);
    assert_eq!(summary.success, 0);
    assert_eq!(summary.fail, 2);
    assert_eq!(summary.average_ttfb_ms, 0);
}

#[test]
fn non_200_status_counts_as_success() {
    let results = vec![Some(Outcome::succeeded("x", 503, 40))];
    assert_eq!(Summary::from_results(&results).success, 1);
}

#[test]
fn rendering_is_repeatable() {
    let results = sample();
    for mode in [OutputMode::Plaintext, OutputMode::Json, OutputMode::Yaml] {
        assert_eq!(render_to_string(&results, mode), render_to_string(&results, mode));
    }
}

#[test]
fn output_mode_parsing_is_permissive() {
    assert_eq!(OutputMode::from("json"), OutputMode::Json);
    assert_eq!(OutputMode::from(" YAML "), OutputMode::Yaml);
    assert_eq!(OutputMode::from("plaintext"), OutputMode::Plaintext);
    assert_eq!(OutputMode::from(""), OutputMode::Plaintext);
    assert_eq!(OutputMode::from("xml"), OutputMode::Plaintext);
    assert_eq!("json".parse::<OutputMode>(), Ok(OutputMode::Json));
}
