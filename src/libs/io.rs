use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Open a file (or `stdin`) for buffered reading. Files ending in `.gz` are
/// decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = subplace::reader("tests/place/backbone.nwk").unwrap();
/// assert_eq!(reader.lines().count(), 1);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("could not open {}: {}", path.display(), e))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Open a file (or `stdout`) for buffered writing.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .map_err(|e| anyhow::anyhow!("could not create {}: {}", output, e))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Read a whole file (or `stdin`) into a string.
pub fn read_to_string(input: &str) -> anyhow::Result<String> {
    let mut reader = reader(input)?;
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(content)
}
