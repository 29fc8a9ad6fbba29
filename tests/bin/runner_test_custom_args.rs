use clap::Args;
use sir_grid::runner::run_with_custom_args;

#[derive(Args, Debug)]
struct Extra {
    /// Raises every behavior fraction to the same value
    #[arg(long)]
    uniform_mix: Option<f64>,
}

fn main() {
    let output = run_with_custom_args(|parameters, _args, extra: Option<Extra>| {
        if let Some(fraction) = extra.and_then(|extra| extra.uniform_mix) {
            parameters.contact_tracing_fraction = fraction;
            parameters.quarantine_fraction = fraction;
            parameters.masked_fraction = fraction;
            parameters.introvert_fraction = fraction;
        }
        Ok(())
    })
    .unwrap();
    println!("{}", output.parameters.masked_fraction);
}
