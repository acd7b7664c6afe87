//! Registry export checked line by line as a scraper would read it.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use reqmeter_core::{CounterVec, HistogramVec, Opts, Registry};

const TRIPLE: [&str; 3] = ["method", "route", "status"];

fn setup() -> (Registry, Arc<HistogramVec>, Arc<CounterVec>) {
    let reg = Registry::new();
    reg.set_default_labels(vec![("app".into(), "my-express-app".into())])
        .unwrap();

    let hist = Arc::new(
        HistogramVec::new(
            Opts::new("http_request_duration_seconds", "Duration of HTTP requests in seconds")
                .labels(&TRIPLE),
            vec![0.1, 0.5, 1.0, 2.0, 5.0],
        )
        .unwrap(),
    );
    let total = Arc::new(
        CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests").labels(&TRIPLE),
        )
        .unwrap(),
    );
    reg.register(hist.clone()).unwrap();
    reg.register(total.clone()).unwrap();
    (reg, hist, total)
}

/// Value of the first sample line starting with `prefix`.
fn sample(text: &str, prefix: &str) -> f64 {
    let line = text
        .lines()
        .find(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix}\n{text}"));
    line.rsplit(' ').next().unwrap().parse().unwrap()
}

#[test]
fn counter_and_histogram_agree() {
    let (reg, hist, total) = setup();
    let get_root = ["GET", "/", "200"];
    for v in [0.01, 0.2, 0.7, 1.5, 4.0, 7.0] {
        hist.observe(&get_root, v).unwrap();
        total.inc(&get_root).unwrap();
    }

    let text = reg.export().unwrap();
    let labels = r#"method="GET",route="/",status="200",app="my-express-app""#;

    let counter = sample(&text, &format!("http_requests_total{{{labels}}}"));
    let count = sample(&text, &format!("http_request_duration_seconds_count{{{labels}}}"));
    assert_eq!(counter, 6.0);
    assert_eq!(count, counter);

    let mut previous = 0.0;
    for le in ["0.1", "0.5", "1", "2", "5", "+Inf"] {
        let c = sample(
            &text,
            &format!("http_request_duration_seconds_bucket{{{labels},le=\"{le}\"}}"),
        );
        assert!(c >= previous, "bucket le={le} decreased");
        previous = c;
    }
    assert_eq!(previous, count);
}

#[test]
fn help_and_type_precede_samples() {
    let (reg, _hist, total) = setup();
    total.inc(&["GET", "/health", "200"]).unwrap();

    let text = reg.export().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let help = lines
        .iter()
        .position(|l| *l == "# HELP http_requests_total Total number of HTTP requests")
        .unwrap();
    assert_eq!(lines[help + 1], "# TYPE http_requests_total counter");
    assert_eq!(
        lines[help + 2],
        r#"http_requests_total{method="GET",route="/health",status="200",app="my-express-app"} 1"#
    );
}
