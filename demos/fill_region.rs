//! Erase a rectangle from a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example fill_region -- input.png output.png 40,20,120,32
//! ```

use std::env;
use std::process;

use watermark_inpaint::{InpaintEngine, MaskSource, ProcessOptions, Quality, Region};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input> <output> <x,y,w,h>", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];
    let region: Region = match args[3].parse() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let opts = ProcessOptions::default();
    let engine = InpaintEngine::new(Quality::default());
    let result = engine.process_file(
        input.as_ref(),
        &MaskSource::Region(region),
        output.as_ref(),
        &opts,
    );

    if result.skipped {
        println!("Skipped: {}", result.message);
    } else if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
