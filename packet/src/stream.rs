use crate::checksum::Checksum;

#[expect(async_fn_in_trait, reason = "every implementor runs on a single-threaded executor")]
pub trait Stream {
    type Item;
    async fn next(&mut self) -> Self::Item;
}

impl<S: Stream> Stream for &mut S {
    type Item = S::Item;

    #[inline(always)]
    async fn next(&mut self) -> Self::Item {
        S::next(self).await
    }
}

#[expect(async_fn_in_trait, reason = "every implementor runs on a single-threaded executor")]
pub trait Sink {
    type Item;
    type Error;

    /// Queue one item, waiting until the previous one has been taken.
    async fn push(&mut self, item: Self::Item) -> Result<(), Self::Error>;
}

impl<S: Sink> Sink for &mut S {
    type Item = S::Item;
    type Error = S::Error;

    #[inline(always)]
    async fn push(&mut self, item: Self::Item) -> Result<(), Self::Error> {
        S::push(self, item).await
    }
}

/// Adds every successfully received byte into a checksum.
pub(crate) struct WithChecksum<'checksum, S> {
    pub(crate) checksum: &'checksum mut Checksum,
    pub(crate) internal: S,
}

impl<E, S: Stream<Item = Result<u8, E>>> Stream for WithChecksum<'_, S> {
    type Item = Result<u8, E>;

    #[inline]
    async fn next(&mut self) -> Self::Item {
        let byte = self.internal.next().await?;
        self.checksum.push(byte);
        Ok(byte)
    }
}

#[cfg(test)]
#[derive(Debug, PartialEq)]
pub(crate) struct Exhausted;

#[cfg(test)]
impl core::fmt::Display for Exhausted {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ran out of bytes")
    }
}

/// Plays back a slice once, then reports `Exhausted`.
#[cfg(test)]
pub(crate) struct Replay<'slice> {
    index: usize,
    slice: &'slice [u8],
}

#[cfg(test)]
impl<'slice> Replay<'slice> {
    #[inline]
    pub(crate) fn new(slice: &'slice [u8]) -> Self {
        Self { index: 0, slice }
    }

    #[inline]
    pub(crate) fn consumed(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
impl Stream for Replay<'_> {
    type Item = Result<u8, Exhausted>;

    #[inline]
    async fn next(&mut self) -> Self::Item {
        let byte = *self.slice.get(self.index).ok_or(Exhausted)?;
        self.index += 1;
        Ok(byte)
    }
}

#[cfg(test)]
pub(crate) struct WithLog<S: Stream>(pub(crate) S);

#[cfg(test)]
impl<S: Stream<Item: core::fmt::Debug>> Stream for WithLog<S> {
    type Item = S::Item;

    #[inline]
    async fn next(&mut self) -> Self::Item {
        let item = self.0.next().await;
        println!("Stream log: {item:02X?}");
        item
    }
}

#[cfg(test)]
impl Sink for Vec<u8> {
    type Item = u8;
    type Error = core::convert::Infallible;

    #[inline]
    async fn push(&mut self, item: u8) -> Result<(), Self::Error> {
        Vec::push(self, item);
        Ok(())
    }
}
