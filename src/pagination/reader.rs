//! Byte reader over serialized objects

use super::iterator::ObjectIterator;
use super::types::ReadProgress;
use crate::error::{Error, Result};
use crate::schema::{RecordSerializer, SourceObject};
use bytes::{Buf, Bytes};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;

/// A lazy, finite stream of newline terminated JSON records
pub type RecordStream = BoxStream<'static, Result<Bytes>>;

/// Serializes objects on demand and hands out the resulting bytes.
///
/// Objects are pulled from the iterator only when the previous record has
/// been fully consumed, so at most one record is buffered.
pub struct ObjectReader<T> {
    objects: ObjectIterator<T>,
    serializer: RecordSerializer,
    pending: Bytes,
    progress: Arc<ReadProgress>,
}

impl<T: SourceObject + 'static> ObjectReader<T> {
    /// Create a reader serializing the objects of `objects`
    pub fn new(objects: ObjectIterator<T>, serializer: RecordSerializer) -> Self {
        Self {
            objects,
            serializer,
            pending: Bytes::new(),
            progress: Arc::new(ReadProgress::new()),
        }
    }

    /// Counters shared with progress reporting
    pub fn progress(&self) -> Arc<ReadProgress> {
        Arc::clone(&self.progress)
    }

    /// Copy the next bytes into `buf`.
    ///
    /// Returns the number of bytes written, `0` at the end of the data or
    /// when `buf` is empty.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || !self.fill().await? {
            return Ok(0);
        }

        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        self.progress.add_bytes(n);
        Ok(n)
    }

    /// Return the rest of the current record, `None` at the end of the data
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.fill().await? {
            return Ok(None);
        }

        let chunk = std::mem::take(&mut self.pending);
        self.progress.add_bytes(chunk.len());
        Ok(Some(chunk))
    }

    /// Convert into a stream of record chunks
    pub fn into_stream(self) -> RecordStream {
        stream::try_unfold(self, |mut reader| async move {
            let chunk = reader.next_chunk().await?;
            Ok::<_, Error>(chunk.map(|chunk| (chunk, reader)))
        })
        .boxed()
    }

    async fn fill(&mut self) -> Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }

        match self.objects.next().await? {
            Some(object) => {
                self.pending = self.serializer.serialize(&object)?;
                self.progress.add_object();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
