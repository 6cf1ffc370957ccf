use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    proofstat::apps::run_summarize_levels(std::env::args().skip(1))
}
