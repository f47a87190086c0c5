/*
 * Output side of the crate. Mention lines go to any writer, one per line,
 * while the standoff rendition of a corpus is laid out as a directory of
 * `<id>.txt` and `<id>.ann` file pairs.
*/
use crate::corpus::{Mention, Sentence};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes gold-style mention lines, one per mention, in the order given.
pub fn write_mentions<W: Write>(mentions: &[Mention], mut writer: W) -> io::Result<()> {
    for mention in mentions {
        writeln!(writer, "{}", mention)?;
    }
    Ok(())
}

/// Writes the standoff lines of one sentence, one annotation per line in
/// attachment order. An unannotated sentence writes nothing.
pub fn write_standoff<W: Write>(sentence: &Sentence, mut writer: W) -> io::Result<()> {
    for line in sentence.to_standoff() {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Writes the standoff rendition of a corpus under `outdir`. Each sentence
/// produces a `<id>.txt` file holding its text and a `<id>.ann` file
/// holding its annotations with literal offsets.
pub fn write_standoff_dir(corpus: &[Sentence], outdir: &Path) -> io::Result<()> {
    for sentence in corpus {
        let txt_path = outdir.join(format!("{}.txt", sentence.id));
        let mut txt = BufWriter::new(File::create(txt_path)?);
        writeln!(txt, "{}", sentence.text)?;
        txt.flush()?;

        let mut ann = BufWriter::new(File::create(outdir.join(format!("{}.ann", sentence.id)))?);
        write_standoff(sentence, &mut ann)?;
        ann.flush()?;
    }
    Ok(())
}
