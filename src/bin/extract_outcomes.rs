use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    proofstat::apps::run_extract_outcomes(std::env::args().skip(1))
}
