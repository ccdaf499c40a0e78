use anyhow::Result;
use gcode_toolpath::cli::run;

fn main() -> Result<()> {
    run()
}
