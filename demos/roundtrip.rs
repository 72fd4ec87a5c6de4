use lzstream::{Decoder, Encoder};
use std::env;
use std::fs::File;
use std::io::{self, Read, Write};

/// Compress stdin and write the result to the path given as the first
/// argument, or decompress it back to stdout if `-d` is passed first.
fn main() -> io::Result<()> {
    let mut args = env::args().skip(1);
    let first = args.next().unwrap_or_default();

    if first == "-d" {
        let filename_in = args.next().expect("usage: roundtrip -d <compressed-file>");
        let file_in = File::open(filename_in)?;
        let mut dec = Decoder::new(file_in);
        let mut out = Vec::new();
        dec.read_to_end(&mut out)?;
        io::stdout().write_all(&out)?;
        return Ok(());
    }

    let filename_out = first;
    if filename_out.is_empty() {
        eprintln!("usage: roundtrip <compressed-file-out>   (reads stdin)");
        eprintln!("       roundtrip -d <compressed-file-in> (writes stdout)");
        std::process::exit(2);
    }

    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;

    let file_out = File::create(filename_out)?;
    let mut enc = Encoder::new(file_out);
    enc.write_all(&buf)?;
    enc.close()?;

    Ok(())
}
