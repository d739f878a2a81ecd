use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

use crate::codec::EntityCodec;
use crate::collection::Document;
use crate::errors::RepositoryResult;
use crate::store::{BackendQuery, Entity, EntityStore};

/// How [SamplingExecutor] picks records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingStrategy {
    /// Counts the kind, draws distinct positions, then keeps the records at
    /// those positions during one scan.
    #[default]
    PositionalScan,
    /// Single-pass reservoir sampling. Does not need a count up front.
    Reservoir,
}

/// Picks records of a kind uniformly at random, without replacement.
///
/// Both strategies read every record of the kind once, so the cost grows with
/// the collection size rather than with `fetch_size`. Results come back in scan
/// order.
#[derive(Clone)]
pub struct SamplingExecutor {
    store: EntityStore,
    codec: EntityCodec,
    strategy: SamplingStrategy,
}

impl SamplingExecutor {
    pub fn new(store: EntityStore, codec: EntityCodec, strategy: SamplingStrategy) -> Self {
        SamplingExecutor {
            store,
            codec,
            strategy,
        }
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    pub fn sample(&self, kind: &str, fetch_size: usize) -> RepositoryResult<Vec<Document>> {
        self.sample_with(kind, fetch_size, &mut rand::thread_rng())
    }

    /// Samples using the given random source.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        kind: &str,
        fetch_size: usize,
        rng: &mut R,
    ) -> RepositoryResult<Vec<Document>> {
        if fetch_size == 0 {
            return Ok(Vec::new());
        }

        let entities = match self.strategy {
            SamplingStrategy::PositionalScan => self.positional_scan(kind, fetch_size, rng)?,
            SamplingStrategy::Reservoir => self.reservoir(kind, fetch_size, rng)?,
        };

        log::debug!(
            "Sampled {} record(s) of kind[{}] with {:?}",
            entities.len(),
            kind,
            self.strategy
        );
        Ok(entities.iter().map(|e| self.codec.to_document(e)).collect())
    }

    fn positional_scan<R: Rng + ?Sized>(
        &self,
        kind: &str,
        fetch_size: usize,
        rng: &mut R,
    ) -> RepositoryResult<Vec<Entity>> {
        let prepared = self.store.prepare_query(&BackendQuery::new(kind))?;
        let total = usize::try_from(self.store.count(&prepared)?).unwrap_or(usize::MAX);
        if total == 0 {
            return Ok(Vec::new());
        }

        if fetch_size >= total {
            return self.store.scan_all(kind)?.collect();
        }

        let positions: HashSet<usize> = index::sample(rng, total, fetch_size).into_iter().collect();
        let mut selected = Vec::with_capacity(fetch_size);
        // full scan: a store error at any position fails the sample
        for (position, entity) in self.store.scan_all(kind)?.enumerate() {
            let entity = entity?;
            if positions.contains(&position) {
                selected.push(entity);
            }
        }
        Ok(selected)
    }

    fn reservoir<R: Rng + ?Sized>(
        &self,
        kind: &str,
        fetch_size: usize,
        rng: &mut R,
    ) -> RepositoryResult<Vec<Entity>> {
        let mut reservoir: Vec<(usize, Entity)> = Vec::with_capacity(fetch_size);
        for (position, entity) in self.store.scan_all(kind)?.enumerate() {
            let entity = entity?;
            if position < fetch_size {
                reservoir.push((position, entity));
            } else {
                let slot = rng.gen_range(0..=position);
                if slot < fetch_size {
                    reservoir[slot] = (position, entity);
                }
            }
        }

        reservoir.sort_by_key(|(position, _)| *position);
        Ok(reservoir.into_iter().map(|(_, entity)| entity).collect())
    }
}
