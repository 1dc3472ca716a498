use crate::snapshot::Observation;
use std::convert::Infallible;

/// Pull interface over a recording: yields one owned snapshot per step.
///
/// Implementations must hand out owned values; the timeline does not assume
/// anything stays alive between calls. `Ok(None)` ends the stream.
pub trait SnapshotSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn next_step(&mut self) -> Result<Option<Vec<Observation>>, Self::Error>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &mut S {
    type Error = S::Error;

    fn next_step(&mut self) -> Result<Option<Vec<Observation>>, Self::Error> {
        (**self).next_step()
    }
}

/// Adapts an iterator of fallible steps into a [`SnapshotSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

/// Iterator behind [`IterSource::from_steps`].
pub type InMemorySteps = std::iter::Map<
    std::vec::IntoIter<Vec<Observation>>,
    fn(Vec<Observation>) -> Result<Vec<Observation>, Infallible>,
>;

impl IterSource<InMemorySteps> {
    /// Source over steps already held in memory.
    pub fn from_steps(steps: Vec<Vec<Observation>>) -> Self {
        let ok: fn(Vec<Observation>) -> Result<Vec<Observation>, Infallible> = Ok;
        Self::new(steps.into_iter().map(ok))
    }
}

impl<I, E> SnapshotSource for IterSource<I>
where
    I: Iterator<Item = Result<Vec<Observation>, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn next_step(&mut self) -> Result<Option<Vec<Observation>>, E> {
        self.inner.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn iter_source_yields_then_ends() {
        let mut source = IterSource::from_steps(vec![
            vec![Observation::new(1, "a", DVec3::ZERO, ["knife"])],
            vec![],
        ]);
        assert_eq!(source.next_step().unwrap().unwrap().len(), 1);
        assert!(source.next_step().unwrap().unwrap().is_empty());
        assert!(source.next_step().unwrap().is_none());
    }

    #[test]
    fn iter_source_propagates_errors() {
        let steps: Vec<Result<Vec<Observation>, std::io::Error>> = vec![
            Ok(vec![]),
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated")),
        ];
        let mut source = IterSource::new(steps.into_iter());
        assert!(source.next_step().is_ok());
        assert!(source.next_step().is_err());
    }
}
