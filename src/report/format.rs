use crate::app::pipeline::AnalysisRun;
use crate::domain::AlignedEvent;
use crate::events::{ImpactRow, categorize_events};

/// Format the full run summary (data quality, EDA, event impact).
pub fn format_analysis_report(run: &AnalysisRun) -> String {
    let mut out = String::new();

    out.push_str("=== brent - Brent Price Analysis ===\n");
    out.push_str(&format!("Prices: {}\n", run.price_source));
    out.push_str(&format!("Events: {}\n", run.event_source));
    if let (Some(first), Some(last)) = (run.series.first_date(), run.series.last_date()) {
        out.push_str(&format!("Range: {first} .. {last} (n={})\n", run.series.len()));
    }

    if let Some(v) = &run.validation {
        out.push_str("\nData quality:\n");
        out.push_str(&format!(
            "- observations: {} | missing: {} ({:.2}%) | duplicate dates: {} | skipped rows: {}\n",
            v.total_observations, v.missing_values, v.missing_pct, v.duplicate_dates, v.skipped_rows
        ));
        out.push_str(&format!(
            "- outliers (IQR): {} outside [{}, {}]\n",
            v.outliers.count,
            fmt_opt(v.outliers.lower_bound, 2),
            fmt_opt(v.outliers.upper_bound, 2)
        ));
    }

    if let Some(rows) = &run.descriptive {
        out.push_str("\nDescriptive statistics:\n");
        for r in rows {
            out.push_str(&format!(
                "- {:<12} n={:<6} mean={} std={} min={} max={} skew={} kurt={}\n",
                r.period,
                r.count,
                fmt_opt(r.mean, 2),
                fmt_opt(r.std, 2),
                fmt_opt(r.min, 2),
                fmt_opt(r.max, 2),
                fmt_opt(r.skew, 3),
                fmt_opt(r.kurtosis, 3),
            ));
        }
    }

    if let Some(t) = &run.trend {
        out.push_str(&format!("\nTrend (window={}):\n", t.window));
        let lt = &t.linear_trend;
        out.push_str(&format!(
            "- slope={:.6}/obs intercept={:.3} r2={:.4} p={}\n",
            lt.slope,
            lt.intercept,
            lt.r_squared,
            fmt_opt(lt.p_value, 4)
        ));
        if let Some(d) = &t.decomposition {
            out.push_str(&format!("- seasonal decomposition with period {}\n", d.period));
        }
    }

    if let Some(s) = &run.stationarity {
        out.push_str("\nStationarity:\n");
        if let Some(adf) = &s.adf {
            out.push_str(&format!(
                "- ADF  stat={:.4} p={:.4} lag={} (5% cv {:.3})\n",
                adf.test_statistic, adf.p_value, adf.used_lag, adf.critical_values.five
            ));
        }
        if let Some(kpss) = &s.kpss {
            out.push_str(&format!(
                "- KPSS stat={:.4} p={:.4} lags={} (5% cv {:.3})\n",
                kpss.test_statistic, kpss.p_value, kpss.lags, kpss.critical_values.five
            ));
        }
        out.push_str(&format!("- conclusion: {}\n", s.conclusion));
    }

    if let Some(v) = &run.volatility {
        out.push_str(&format!("\nVolatility (window={}):\n", v.window));
        out.push_str(&format!(
            "- daily={} annualized={} rolling max={} min={} vol-of-vol={}\n",
            fmt_opt(v.stats.mean_volatility, 4),
            fmt_opt(v.stats.annualized_volatility, 4),
            fmt_opt(v.stats.max_volatility, 4),
            fmt_opt(v.stats.min_volatility, 4),
            fmt_opt(v.stats.volatility_of_volatility, 4),
        ));
        if let Some(arch) = &v.arch_test {
            out.push_str(&format!(
                "- ARCH (Ljung-Box on r^2): Q={:.2} p={:.4} effects={}\n",
                arch.ljung_box_statistic,
                arch.p_value,
                if arch.has_arch_effects { "yes" } else { "no" }
            ));
        }
    }

    if let Some(ac) = &run.autocorrelation {
        let shown: Vec<String> = ac.acf.iter().skip(1).take(5).map(|x| format!("{x:.3}")).collect();
        out.push_str(&format!("\nACF lags 1-5: [{}]\n", shown.join(", ")));
    }

    if !run.aligned.is_empty() {
        out.push_str("\nEvents:\n");
        out.push_str(&format_events_table(&run.aligned));
        out.push_str("\nEvent groups:\n");
        out.push_str(&format_event_groups(&run.aligned));
    }
    if !run.impact.is_empty() {
        out.push_str("\nEvent impact (price change %):\n");
        out.push_str(&format_impact_table(&run.impact));
    }

    if !run.failures.is_empty() {
        out.push_str("\nSkipped steps:\n");
        for f in &run.failures {
            out.push_str(&format!("  ({}) {}\n", f.step, f.message));
        }
    }

    out
}

pub fn format_events_table(rows: &[AlignedEvent]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:<14} {:<24} {:>10} {:>10} {:>9}",
            "date", "type", "description", "before", "after", "change%"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<10} {:-<14} {:-<24} {:-<10} {:-<10} {:-<9}", "", "", "", "", "", ""),
    );

    for r in rows {
        let e = &r.event;
        push_line(
            &mut out,
            format!(
                "{:<10} {:<14} {:<24} {:>10} {:>10} {:>9}",
                e.event_date,
                truncate(e.event_type.as_deref().unwrap_or(""), 14),
                truncate(e.event_description.as_deref().unwrap_or(""), 24),
                fmt_opt(r.impact.price_before, 2),
                fmt_opt(r.impact.price_after, 2),
                fmt_opt(r.impact.price_change_pct, 2),
            ),
        );
    }
    out
}

/// One line per event type and `impact_<type>` group with its event count.
pub fn format_event_groups(rows: &[AlignedEvent]) -> String {
    let mut out = String::new();
    for (group, events) in categorize_events(rows) {
        push_line(&mut out, format!("- {group:<28} {:>3}", events.len()));
    }
    out
}

pub fn format_impact_table(rows: &[ImpactRow]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<28} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "category", "n", "mean", "median", "std", "max", "min"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<28} {:-<5} {:-<8} {:-<8} {:-<8} {:-<8} {:-<8}", "", "", "", "", "", "", ""),
    );

    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<28} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8}",
                truncate(&r.category, 28),
                r.count,
                fmt_opt(r.mean_price_change_pct, 2),
                fmt_opt(r.median_price_change_pct, 2),
                fmt_opt(r.std_price_change_pct, 2),
                fmt_opt(r.max_price_change_pct, 2),
                fmt_opt(r.min_price_change_pct, 2),
            ),
        );
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
