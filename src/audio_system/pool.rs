/// Source pool
///
/// Reusable emitters handed out per playback request. Slots are created on
/// demand and never destroyed; released slots wait on a free stack.
use glam::Vec3;

use super::backend::AudioBackend;
use super::source::{EmitterSettings, PooledSource, SourceAnchor, SourceHandle};
use crate::config::PoolConfig;
use crate::error::{MixerError, MixerResult};

/// Emitters owned by the pool, addressed by generational handles
pub struct SourcePool {
    backend: Box<dyn AudioBackend>,
    sources: Vec<PooledSource>,
    free: Vec<usize>,
    defaults: EmitterSettings,
    max_sources: Option<usize>,
}

impl SourcePool {
    /// Create an empty pool drawing emitters from `backend`
    pub fn new(backend: Box<dyn AudioBackend>, config: &PoolConfig) -> Self {
        tracing::debug!("Source pool using {} backend", backend.name());
        Self {
            backend,
            sources: Vec::new(),
            free: Vec::new(),
            defaults: EmitterSettings::from_pool_config(config),
            max_sources: config.max_sources,
        }
    }

    /// Hand out a source reset to default settings at `position`
    pub fn acquire(&mut self, anchor: SourceAnchor, position: Vec3) -> MixerResult<SourceHandle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                if let Some(capacity) = self.max_sources {
                    if self.sources.len() >= capacity {
                        return Err(MixerError::PoolExhausted { capacity });
                    }
                }
                let emitter = self.backend.create_emitter()?;
                self.sources.push(PooledSource::new(emitter, self.defaults));
                tracing::trace!("Source pool grew to {}", self.sources.len());
                self.sources.len() - 1
            }
        };

        let source = &mut self.sources[index];
        source.generation = source.generation.wrapping_add(1);
        source.in_use = true;
        source.settings = self.defaults;
        source.anchor = anchor;
        source.position = position;
        source.looping = false;
        source.clip = None;
        source.remaining = None;
        source.emitter.set_active(true);
        source.emitter.set_pitch(1.0);
        source.emitter.set_position(position);

        Ok(SourceHandle {
            index: index as u32,
            generation: source.generation,
        })
    }

    /// Stop and deactivate a source, returning it to the free stack
    pub fn release(&mut self, handle: SourceHandle) -> MixerResult<()> {
        let source = self.get_mut(handle).ok_or(MixerError::InvalidHandle)?;
        source.emitter.stop();
        source.emitter.set_active(false);
        source.in_use = false;
        source.clip = None;
        source.remaining = None;
        self.free.push(handle.index as usize);
        Ok(())
    }

    /// Get a checked-out source; stale handles give `None`
    pub fn get(&self, handle: SourceHandle) -> Option<&PooledSource> {
        self.sources
            .get(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
    }

    /// Get a checked-out source mutably
    pub fn get_mut(&mut self, handle: SourceHandle) -> Option<&mut PooledSource> {
        self.sources
            .get_mut(handle.index as usize)
            .filter(|s| s.in_use && s.generation == handle.generation)
    }

    /// Whether `handle` still addresses a checked-out source
    pub fn contains(&self, handle: SourceHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Sources currently handed out
    pub fn iter_active(&self) -> impl Iterator<Item = (SourceHandle, &PooledSource)> {
        self.sources
            .iter()
            .enumerate()
            .filter(|(_, s)| s.in_use)
            .map(|(i, s)| (Self::handle_for(i, s), s))
    }

    /// Sources currently handed out, mutably
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (SourceHandle, &mut PooledSource)> {
        self.sources
            .iter_mut()
            .enumerate()
            .filter(|(_, s)| s.in_use)
            .map(|(i, s)| (Self::handle_for(i, s), s))
    }

    fn handle_for(index: usize, source: &PooledSource) -> SourceHandle {
        SourceHandle {
            index: index as u32,
            generation: source.generation,
        }
    }

    /// Total slots ever created
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Released slots waiting for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Slots currently handed out
    pub fn in_use_count(&self) -> usize {
        self.sources.len() - self.free.len()
    }

    /// Configured cap, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.max_sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::mock::MockBackend;

    fn pool(max_sources: Option<usize>) -> (SourcePool, MockBackend) {
        let backend = MockBackend::new();
        let config = PoolConfig {
            max_sources,
            ..Default::default()
        };
        (SourcePool::new(Box::new(backend.clone()), &config), backend)
    }

    #[test]
    fn test_pool_grows_on_demand() {
        let (mut pool, backend) = pool(None);
        let a = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        let b = pool.acquire(SourceAnchor::World, Vec3::ONE).unwrap();

        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.in_use_count(), 2);
        assert_eq!(backend.created(), 2);
        assert_eq!(pool.get(b).unwrap().position(), Vec3::ONE);
    }

    #[test]
    fn test_released_source_is_reused() {
        let (mut pool, backend) = pool(None);
        let first = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        pool.release(first).unwrap();

        assert_eq!(pool.free_count(), 1);
        assert!(!backend.emitter(0).active);

        let second = pool.acquire(SourceAnchor::Listener, Vec3::X).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(backend.created(), 1);
        assert!(backend.emitter(0).active);
        assert_eq!(second.index, first.index);
        assert_ne!(second.generation, first.generation);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let (mut pool, _) = pool(None);
        let first = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        pool.release(first).unwrap();
        let _second = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();

        assert!(pool.get(first).is_none());
        assert!(matches!(pool.release(first), Err(MixerError::InvalidHandle)));
        assert_eq!(pool.in_use_count(), 1);
    }

    #[test]
    fn test_reacquire_resets_settings() {
        let (mut pool, _) = pool(None);
        let handle = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        {
            let source = pool.get_mut(handle).unwrap();
            source.settings.volume = 0.2;
            source.settings.spatial_blend = 1.0;
            source.settings.max_distance = 12.0;
        }
        pool.release(handle).unwrap();

        let handle = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        assert_eq!(*pool.get(handle).unwrap().settings(), EmitterSettings::default());
    }

    #[test]
    fn test_capacity_applies_back_pressure() {
        let (mut pool, _) = pool(Some(1));
        let handle = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();

        assert!(matches!(
            pool.acquire(SourceAnchor::World, Vec3::ZERO),
            Err(MixerError::PoolExhausted { capacity: 1 })
        ));

        pool.release(handle).unwrap();
        assert!(pool.acquire(SourceAnchor::World, Vec3::ZERO).is_ok());
    }

    #[test]
    fn test_iter_active_skips_free_slots() {
        let (mut pool, _) = pool(None);
        let a = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        let b = pool.acquire(SourceAnchor::World, Vec3::ZERO).unwrap();
        pool.release(a).unwrap();

        let active: Vec<_> = pool.iter_active().map(|(h, _)| h).collect();
        assert_eq!(active, vec![b]);
    }
}
