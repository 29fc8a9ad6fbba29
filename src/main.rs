use sir_grid::run_with_args;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_with_args()?;
    let summary = output.summary;
    println!(
        "Simulated {} days. Final {}. Peak infectious: {}{}",
        summary.days,
        summary.final_demographics,
        summary.peak_infectious,
        summary
            .peak_day
            .map(|day| format!(" on day {day}"))
            .unwrap_or_default()
    );
    println!("Report written to {}", output.report_path.display());
    Ok(())
}
