//! Archive extraction actions.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use flate2::read::GzDecoder;
use log::info;
use tar::Archive;

use crate::action::{Action, TaskContext};
use crate::error::FlowError;

/// Unpacks a gzip-compressed tar archive into a directory.
pub struct UnpackArchive {
    archive: PathBuf,
    dest: PathBuf,
}

impl UnpackArchive {
    pub fn new(archive: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            dest: dest.into(),
        }
    }
}

impl Action for UnpackArchive {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError> {
        let file = File::open(&self.archive).map_err(|e| FlowError::io(&self.archive, e))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        // the staleness check needs extraction-time mtimes, archived ones
        // may predate the archive file itself
        archive.set_preserve_mtime(false);
        archive.unpack(&self.dest).map_err(|e| FlowError::io(&self.dest, e))?;
        info!("{}: unpacked {} into {}", ctx.name, self.archive.display(), self.dest.display());
        Ok(())
    }
}

/// Decompresses a single gzip file.
pub struct GunzipFile {
    src: PathBuf,
    dest: PathBuf,
}

impl GunzipFile {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

impl Action for GunzipFile {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError> {
        let file = File::open(&self.src).map_err(|e| FlowError::io(&self.src, e))?;
        let mut decoder = GzDecoder::new(file);
        let mut dest = File::create(&self.dest).map_err(|e| FlowError::io(&self.dest, e))?;
        io::copy(&mut decoder, &mut dest).map_err(|e| FlowError::io(&self.dest, e))?;
        info!("{}: decompressed {} into {}", ctx.name, self.src.display(), self.dest.display());
        Ok(())
    }
}
