use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    border_pairs::app::run_border_pairs(std::env::args().skip(1))
}
