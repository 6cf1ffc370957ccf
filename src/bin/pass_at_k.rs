use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    proofstat::apps::run_pass_at_k(std::env::args().skip(1))
}
