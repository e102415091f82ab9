use epigraph::runner::{run_with_args, summarize};

fn main() {
    match run_with_args() {
        Ok(simulation) => println!("{}", summarize(&simulation)),
        Err(error) => {
            eprintln!("epigraph: {error}");
            std::process::exit(1);
        }
    }
}
