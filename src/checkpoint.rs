//! Checkpoints
//!
//! Saves a trained model together with the configuration and vocabulary that
//! produced it, so embeddings can be reloaded and queried by word later.
//!
//! ## File Layout
//!
//! ```text
//! "SKIPGRAM_CKPT"            magic
//! u8                          format version (1)
//! u32 + bytes                 config JSON
//! u8                          1 if a vocabulary follows, else 0
//! [u32 + bytes]               vocabulary JSON
//! matrix × 3                  embedding, output_weight, output_bias
//!
//! matrix := u32 rank, u32 dims[rank], u32 len, f32 data[len]
//! ```
//!
//! All integers and floats are little-endian.

use crate::config::SkipGramConfig;
use crate::error::{Result, SkipGramError};
use crate::model::SkipGram;
use crate::vocab::Vocabulary;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8] = b"SKIPGRAM_CKPT";
const VERSION: u8 = 1;

/// A model with the config and vocabulary it was trained with
pub struct Checkpoint {
    pub config: SkipGramConfig,
    pub vocab: Option<Vocabulary>,
    pub model: SkipGram,
}

impl Checkpoint {
    /// Save checkpoint to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::info!("saving checkpoint to {}", path.display());

        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(MAGIC)?;
        file.write_all(&[VERSION])?;

        write_block(&mut file, serde_json::to_string(&self.config)?.as_bytes())?;

        match &self.vocab {
            Some(vocab) => {
                file.write_all(&[1])?;
                write_block(&mut file, serde_json::to_string(vocab)?.as_bytes())?;
            }
            None => file.write_all(&[0])?,
        }

        let (v, d) = (self.model.vocab_size, self.model.embedding_dim);
        write_matrix(&mut file, &[v, d], &self.model.embedding)?;
        write_matrix(&mut file, &[d, v], &self.model.output_weight)?;
        write_matrix(&mut file, &[v], &self.model.output_bias)?;

        file.flush()?;
        Ok(())
    }

    /// Load checkpoint from file
    ///
    /// # Errors
    ///
    /// [`SkipGramError::Checkpoint`] if the magic, version or any matrix
    /// shape is wrong, the stored config or vocabulary is invalid, or the
    /// vocabulary does not match the model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading checkpoint from {}", path.display());

        let mut file = BufReader::new(File::open(path)?);

        let mut magic = vec![0u8; MAGIC.len()];
        file.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(SkipGramError::Checkpoint("not a skip-gram checkpoint".into()));
        }
        let version = read_u8(&mut file)?;
        if version != VERSION {
            return Err(SkipGramError::Checkpoint(format!(
                "unsupported format version {}",
                version
            )));
        }

        let config: SkipGramConfig = serde_json::from_slice(&read_block(&mut file)?)?;
        config
            .validate()
            .map_err(|e| SkipGramError::Checkpoint(format!("stored config is invalid: {}", e)))?;

        let vocab = match read_u8(&mut file)? {
            0 => None,
            1 => Some(
                Vocabulary::from_json(&read_block(&mut file)?).map_err(|e| {
                    SkipGramError::Checkpoint(format!("stored vocabulary is invalid: {}", e))
                })?,
            ),
            other => {
                return Err(SkipGramError::Checkpoint(format!(
                    "bad vocabulary flag {}",
                    other
                )))
            }
        };

        let (emb_dims, embedding) = read_matrix(&mut file)?;
        let (out_dims, output_weight) = read_matrix(&mut file)?;
        let (bias_dims, output_bias) = read_matrix(&mut file)?;

        let [vocab_size, embedding_dim] = emb_dims[..] else {
            return Err(SkipGramError::Checkpoint("embedding must be 2-D".into()));
        };
        if out_dims != [embedding_dim, vocab_size] || bias_dims != [vocab_size] {
            return Err(SkipGramError::Checkpoint(format!(
                "inconsistent shapes: embedding {:?}, output {:?}, bias {:?}",
                emb_dims, out_dims, bias_dims
            )));
        }
        if embedding_dim != config.embedding_dim {
            return Err(SkipGramError::Checkpoint(format!(
                "config embedding_dim {} does not match weights ({})",
                config.embedding_dim, embedding_dim
            )));
        }
        if let Some(vocab) = &vocab {
            if vocab.vocab_size() != vocab_size {
                return Err(SkipGramError::Checkpoint(format!(
                    "vocabulary has {} entries but the model has {}",
                    vocab.vocab_size(),
                    vocab_size
                )));
            }
        }

        Ok(Self {
            config,
            vocab,
            model: SkipGram {
                vocab_size,
                embedding_dim,
                embedding,
                output_weight,
                output_bias,
            },
        })
    }
}

fn write_u32<W: Write>(w: &mut W, value: usize) -> Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| SkipGramError::Checkpoint(format!("{} does not fit in u32", value)))?;
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_block<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_u32(w, bytes.len())?;
    w.write_all(bytes)?;
    Ok(())
}

fn write_matrix<W: Write>(w: &mut W, dims: &[usize], data: &[f32]) -> Result<()> {
    write_u32(w, dims.len())?;
    for &dim in dims {
        write_u32(w, dim)?;
    }
    write_u32(w, data.len())?;
    for &val in data {
        w.write_all(&val.to_le_bytes())?;
    }
    Ok(())
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(r: &mut R) -> Result<usize> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf) as usize)
}

fn read_block<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = read_u32(r)?;
    let mut bytes = Vec::new();
    r.take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(SkipGramError::Checkpoint("truncated block".into()));
    }
    Ok(bytes)
}

fn read_matrix<R: Read>(r: &mut R) -> Result<(Vec<usize>, Vec<f32>)> {
    let rank = read_u32(r)?;
    if rank > 2 {
        return Err(SkipGramError::Checkpoint(format!("unexpected rank {}", rank)));
    }
    let dims = (0..rank).map(|_| read_u32(r)).collect::<Result<Vec<_>>>()?;
    let len = read_u32(r)?;
    if dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) != Some(len) {
        return Err(SkipGramError::Checkpoint(format!(
            "matrix of shape {:?} cannot hold {} values",
            dims, len
        )));
    }

    // Read what the file actually holds rather than reserving from the header
    let mut bytes = Vec::new();
    r.take(len as u64 * 4).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len as u64 * 4 {
        return Err(SkipGramError::Checkpoint(format!(
            "truncated matrix: expected {} values, found {}",
            len,
            bytes.len() / 4
        )));
    }

    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok((dims, data))
}
