//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use crate::family::{MetricFamily, SeriesValue};

/// Content type served alongside [`encode`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Render a sample value. Rust's `Display` for `f64` never uses exponents.
fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "+Inf" } else { "-Inf" };
        s.to_string()
    } else {
        v.to_string()
    }
}

/// Series labels in declaration order, then defaults the series does not override.
fn merged_labels<'a>(
    own: &'a [(String, String)],
    defaults: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    let mut out: Vec<(&str, &str)> = own.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    for (k, v) in defaults {
        if !own.iter().any(|(ok, _)| ok == k) {
            out.push((k.as_str(), v.as_str()));
        }
    }
    out
}

fn label_block(labels: &[(&str, &str)], le: Option<&str>) -> String {
    let mut parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some(le) = le {
        parts.push(format!("le=\"{le}\""));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

/// Encode families in the given order, appending `defaults` to every series.
pub fn encode(families: &[MetricFamily], defaults: &[(String, String)]) -> String {
    let mut out = String::new();
    for fam in families {
        let _ = writeln!(out, "# HELP {} {}", fam.name, escape_help(&fam.help));
        let _ = writeln!(out, "# TYPE {} {}", fam.name, fam.kind.as_str());

        for s in &fam.series {
            let labels = merged_labels(&s.labels, defaults);
            match &s.value {
                SeriesValue::Counter(v) => {
                    let _ = writeln!(out, "{}{} {}", fam.name, label_block(&labels, None), v);
                }
                SeriesValue::Gauge(v) => {
                    let _ = writeln!(
                        out,
                        "{}{} {}",
                        fam.name,
                        label_block(&labels, None),
                        format_value(*v)
                    );
                }
                SeriesValue::Histogram { buckets, sum, count } => {
                    for (le, c) in buckets {
                        let le = format_value(*le);
                        let _ = writeln!(
                            out,
                            "{}_bucket{} {}",
                            fam.name,
                            label_block(&labels, Some(&le)),
                            c
                        );
                    }
                    let _ = writeln!(
                        out,
                        "{}_bucket{} {}",
                        fam.name,
                        label_block(&labels, Some("+Inf")),
                        count
                    );
                    let plain = label_block(&labels, None);
                    let _ = writeln!(out, "{}_sum{} {}", fam.name, plain, format_value(*sum));
                    let _ = writeln!(out, "{}_count{} {}", fam.name, plain, count);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{MetricKind, Series};

    fn app() -> Vec<(String, String)> {
        vec![("app".to_string(), "my-express-app".to_string())]
    }

    #[test]
    fn counter_with_default_label() {
        let fam = MetricFamily {
            name: "http_requests_total".into(),
            help: "Total number of HTTP requests".into(),
            kind: MetricKind::Counter,
            series: vec![Series {
                labels: vec![
                    ("method".into(), "GET".into()),
                    ("route".into(), "/".into()),
                    ("status".into(), "200".into()),
                ],
                value: SeriesValue::Counter(2),
            }],
        };
        let text = encode(&[fam], &app());
        assert_eq!(
            text,
            "# HELP http_requests_total Total number of HTTP requests\n\
             # TYPE http_requests_total counter\n\
             http_requests_total{method=\"GET\",route=\"/\",status=\"200\",app=\"my-express-app\"} 2\n"
        );
    }

    #[test]
    fn series_label_overrides_default() {
        let fam = MetricFamily {
            name: "m".into(),
            help: "h".into(),
            kind: MetricKind::Counter,
            series: vec![Series {
                labels: vec![("app".into(), "other".into())],
                value: SeriesValue::Counter(1),
            }],
        };
        let text = encode(&[fam], &app());
        assert!(text.contains("m{app=\"other\"} 1\n"));
        assert!(!text.contains("my-express-app"));
    }

    #[test]
    fn unlabelled_gauge_without_defaults() {
        let fam = MetricFamily::gauge("process_uptime_seconds", "Uptime", 12.5);
        let text = encode(&[fam], &[]);
        assert!(text.ends_with("process_uptime_seconds 12.5\n"));
    }

    #[test]
    fn histogram_lines() {
        let fam = MetricFamily {
            name: "d".into(),
            help: "d".into(),
            kind: MetricKind::Histogram,
            series: vec![Series {
                labels: vec![("route".into(), "/".into())],
                value: SeriesValue::Histogram {
                    buckets: vec![(0.1, 1), (1.0, 2)],
                    sum: 0.75,
                    count: 3,
                },
            }],
        };
        let text = encode(&[fam], &app());
        assert!(text.contains("d_bucket{route=\"/\",app=\"my-express-app\",le=\"0.1\"} 1\n"));
        assert!(text.contains("d_bucket{route=\"/\",app=\"my-express-app\",le=\"1\"} 2\n"));
        assert!(text.contains("d_bucket{route=\"/\",app=\"my-express-app\",le=\"+Inf\"} 3\n"));
        assert!(text.contains("d_sum{route=\"/\",app=\"my-express-app\"} 0.75\n"));
        assert!(text.contains("d_count{route=\"/\",app=\"my-express-app\"} 3\n"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
        assert_eq!(escape_help("line\nnext"), "line\\nnext");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(0.0000001), "0.0000001");
    }
}
