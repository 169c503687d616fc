// File: src/persistence.rs
use crate::core::tokenizer::Tokenizer;
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Destination for sequences the engine has just learned.
pub trait CorpusSink: Send + Sync {
    /// Durably records `sequences`, one line each, in order.
    fn append(&mut self, sequences: &[Vec<String>]) -> Result<()>;
}

/// Append-only text log of learned sequences: one line per sequence,
/// tokens joined by single spaces.
#[derive(Debug)]
pub struct CorpusStore {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the whole log with `sequences`.
    ///
    /// The new content goes to a temp file next to the log and is renamed
    /// over it, so a crash leaves either the old log or the new one.
    pub fn rewrite(&mut self, sequences: &[Vec<String>]) -> Result<()> {
        // the open append handle would point at the replaced inode
        self.writer = None;

        let parent_dir = parent_dir(&self.path);
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            write_lines(&mut writer, sequences)?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path)?;

        info!(path = %self.path.display(), sequences = sequences.len(), "rewrote corpus log");
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                fs::create_dir_all(parent_dir(&self.path))?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?;
                BufWriter::new(file)
            }
        };
        Ok(self.writer.insert(writer))
    }
}

impl CorpusSink for CorpusStore {
    fn append(&mut self, sequences: &[Vec<String>]) -> Result<()> {
        if sequences.is_empty() {
            return Ok(());
        }
        let writer = self.writer()?;
        let written = write_lines(writer, sequences)
            .and_then(|()| writer.flush().map_err(Into::into))
            .and_then(|()| writer.get_ref().sync_data().map_err(Into::into));
        if let Err(e) = written {
            // reopen on the next append instead of reusing a failed buffer
            self.writer = None;
            return Err(e);
        }
        debug!(sequences = sequences.len(), "appended to corpus log");
        Ok(())
    }
}

fn write_lines<W: Write>(writer: &mut W, sequences: &[Vec<String>]) -> Result<()> {
    for seq in sequences {
        writer.write_all(seq.join(" ").as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// True for sources stored as a YAML list of sentinel-delimited tokens.
pub fn is_structured_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Reads a corpus source into token sequences.
///
/// `.yml`/`.yaml` files hold a flat list of tokens delimited by
/// `<START>`/`<STOP>`; everything else is plain text tokenized line by line.
pub fn read_source(path: &Path, tokenizer: &Tokenizer) -> Result<Vec<Vec<String>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    if is_structured_source(path) {
        let tokens: Vec<String> = serde_yaml::from_reader(reader)?;
        return Ok(Tokenizer::split_delimited(tokens));
    }

    let mut sequences = Vec::new();
    for line in reader.lines() {
        let line = line?;
        sequences.extend(tokenizer.tokenize(&line));
    }
    Ok(sequences)
}

/// Reads back a corpus log written by [`CorpusStore`]. A log that does not
/// exist yet is an empty log.
pub fn read_log(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut sequences = Vec::new();
    for line in BufReader::new(file).lines() {
        let record = Tokenizer::split_record(&line?);
        if !record.is_empty() {
            sequences.push(record);
        }
    }
    Ok(sequences)
}

/// [`read_source`], degrading to an empty corpus with a warning.
pub fn load_source_or_empty(path: &Path, tokenizer: &Tokenizer) -> Vec<Vec<String>> {
    match read_source(path, tokenizer) {
        Ok(sequences) => {
            info!(path = %path.display(), sequences = sequences.len(), "loaded corpus source");
            sequences
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read corpus source, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn append_then_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learned.txt");
        let mut store = CorpusStore::new(&path);

        store.append(&[seq(&["a", "b"])]).unwrap();
        store.append(&[seq(&["c", "d", "e"])]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a b\nc d e\n");

        store.rewrite(&[seq(&["x", "y"])]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x y\n");

        // appends after a rewrite land in the new file
        store.append(&[seq(&["z", "z"])]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x y\nz z\n");
    }

    #[test]
    fn empty_append_does_not_create_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("learned.txt");
        let mut store = CorpusStore::new(&path);
        store.append(&[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn plain_source_is_tokenized_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.txt");
        fs::write(&path, "Hello world. Bye!\nno stop here\n").unwrap();

        let out = read_source(&path, &Tokenizer::default()).unwrap();
        assert_eq!(
            out,
            vec![seq(&["Hello", "world"]), seq(&["Bye"]), seq(&["no", "stop", "here"])]
        );
    }

    #[test]
    fn yaml_source_is_split_on_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brain.yml");
        fs::write(
            &path,
            "- <START>\n- hello\n- there.\n- <STOP>\n- <START>\n- again\n- <STOP>\n",
        )
        .unwrap();

        let out = read_source(&path, &Tokenizer::new(["hello"])).unwrap();
        assert_eq!(out, vec![seq(&["hello", "there."]), seq(&["again"])]);
    }

    #[test]
    fn log_reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learned.txt");
        assert!(read_log(&path).unwrap().is_empty());

        let written = vec![seq(&["hello", "there."]), seq(&["why?", "not"])];
        let mut store = CorpusStore::new(&path);
        store.append(&written).unwrap();
        assert_eq!(read_log(&path).unwrap(), written);
    }

    #[test]
    fn missing_source_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let out = load_source_or_empty(&dir.path().join("nope.txt"), &Tokenizer::default());
        assert!(out.is_empty());
    }
}
