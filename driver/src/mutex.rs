use {
    core::{convert::Infallible, ops::DerefMut},
    embassy_sync::blocking_mutex::raw::RawMutex,
};

/// Exclusive access to a bus shared between tasks.
#[expect(async_fn_in_trait, reason = "every implementor runs on a single-threaded executor")]
pub trait Mutex {
    type Item;
    type Error;
    fn new(item: Self::Item) -> Self;
    async fn lock(&self) -> Result<impl DerefMut<Target = Self::Item>, Self::Error>;
}

impl<R: RawMutex, T> Mutex for embassy_sync::mutex::Mutex<R, T> {
    type Item = T;
    type Error = Infallible;

    #[inline(always)]
    fn new(item: T) -> Self {
        embassy_sync::mutex::Mutex::new(item)
    }

    #[inline(always)]
    async fn lock(&self) -> Result<impl DerefMut<Target = T>, Infallible> {
        Ok(embassy_sync::mutex::Mutex::lock(self).await)
    }
}
