use glam::Vec3;
use horizon_common::{ObjectId, SceneryBackend, TemplateId, Transform};
use std::collections::BTreeMap;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Object was constructed from a template with the given transform.
    Spawned {
        id: ObjectId,
        template: TemplateId,
        transform: Transform,
    },
    /// Deferred construction of the object was completed.
    Finished { id: ObjectId },
    /// Object was destroyed. Carries the data it had.
    Destroyed {
        id: ObjectId,
        template: TemplateId,
        transform: Transform,
    },
}

/// Per-object data stored in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub template: TemplateId,
    pub transform: Transform,
    pub finished: bool,
}

/// In-memory object store that plays the role of the engine spawner.
///
/// Templates must be registered with their local bounds before they can be
/// spawned. Object ids are handed out sequentially, so two scenes driven by
/// the same sequence of calls end up with identical ids and identical hashes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    templates: BTreeMap<TemplateId, Vec3>,
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    /// Append-only event log of all mutations.
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `template` spawnable. `bounds` is the size of its local bounding box.
    pub fn register_template(&mut self, template: impl Into<TemplateId>, bounds: Vec3) {
        self.templates.insert(template.into(), bounds);
    }

    /// Builder-style [`Scene::register_template`].
    pub fn with_template(mut self, template: impl Into<TemplateId>, bounds: Vec3) -> Self {
        self.register_template(template, bounds);
        self
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of live objects built from `template`.
    pub fn count_of(&self, template: &TemplateId) -> usize {
        self.objects
            .values()
            .filter(|o| &o.template == template)
            .count()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Read-only access to all live objects (BTreeMap for deterministic iteration).
    pub fn objects(&self) -> &BTreeMap<ObjectId, SceneObject> {
        &self.objects
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Total objects ever constructed.
    pub fn spawned_total(&self) -> u64 {
        self.next_id
    }

    /// Total destroy events recorded in the current log.
    pub fn destroyed_in_log(&self) -> usize {
        self.event_log
            .iter()
            .filter(|e| matches!(e, SceneEvent::Destroyed { .. }))
            .count()
    }

    /// Compute a deterministic hash of the live objects for comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, object) in &self.objects {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, object.template.as_str().as_bytes());
            for v in object.transform.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in object.transform.scale.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}

impl SceneryBackend for Scene {
    type Handle = ObjectId;

    fn begin_spawn(&mut self, template: &TemplateId, transform: &Transform) -> Option<ObjectId> {
        if !self.templates.contains_key(template) {
            tracing::debug!(%template, "spawn refused: unknown template");
            return None;
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            SceneObject {
                template: template.clone(),
                transform: *transform,
                finished: false,
            },
        );
        self.event_log.push(SceneEvent::Spawned {
            id,
            template: template.clone(),
            transform: *transform,
        });
        Some(id)
    }

    fn finish_spawn(&mut self, handle: ObjectId) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.finished = true;
            self.event_log.push(SceneEvent::Finished { id: handle });
        }
    }

    fn destroy(&mut self, handle: ObjectId) {
        if let Some(object) = self.objects.remove(&handle) {
            self.event_log.push(SceneEvent::Destroyed {
                id: handle,
                template: object.template,
                transform: object.transform,
            });
        }
    }

    fn local_bounds(&self, handle: ObjectId) -> Option<Vec3> {
        let object = self.objects.get(&handle)?;
        self.templates.get(&object.template).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new().with_template("box", Vec3::new(100.0, 200.0, 100.0))
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new();
        assert_eq!(s.object_count(), 0);
        assert!(s.events().is_empty());
    }

    #[test]
    fn spawn_and_destroy() {
        let mut s = scene();
        let id = s.spawn(&"box".into(), &Transform::default()).unwrap();
        assert_eq!(s.object_count(), 1);
        assert!(s.get(id).unwrap().finished);

        s.destroy(id);
        assert_eq!(s.object_count(), 0);
        assert_eq!(s.destroyed_in_log(), 1);
    }

    #[test]
    fn unknown_template_is_refused() {
        let mut s = scene();
        assert!(s.spawn(&"missing".into(), &Transform::default()).is_none());
        assert_eq!(s.spawned_total(), 0);
        assert!(s.events().is_empty());
    }

    #[test]
    fn deferred_spawn_is_unfinished_until_finished() {
        let mut s = scene();
        let id = s.begin_spawn(&"box".into(), &Transform::default()).unwrap();
        assert!(!s.get(id).unwrap().finished);
        assert_eq!(s.local_bounds(id), Some(Vec3::new(100.0, 200.0, 100.0)));
        s.finish_spawn(id);
        assert!(s.get(id).unwrap().finished);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut s = scene();
        let id = s.spawn(&"box".into(), &Transform::default()).unwrap();
        s.destroy(id);
        s.destroy(id);
        assert_eq!(s.destroyed_in_log(), 1);
        assert!(s.local_bounds(id).is_none());
    }

    #[test]
    fn ids_are_sequential() {
        let mut s = scene();
        let a = s.spawn(&"box".into(), &Transform::default()).unwrap();
        let b = s.spawn(&"box".into(), &Transform::default()).unwrap();
        assert_eq!(a, ObjectId(0));
        assert_eq!(b, ObjectId(1));
    }

    #[test]
    fn state_hash_deterministic() {
        let mut s1 = scene();
        let mut s2 = scene();
        let t = Transform::from_position_scale(Vec3::new(5.0, 0.0, 1.0), Vec3::ONE);
        s1.spawn(&"box".into(), &t);
        s2.spawn(&"box".into(), &t);
        assert_eq!(s1.state_hash(), s2.state_hash());

        s2.spawn(&"box".into(), &t);
        assert_ne!(s1.state_hash(), s2.state_hash());
    }

    #[test]
    fn drain_events_clears_log() {
        let mut s = scene();
        s.spawn(&"box".into(), &Transform::default());
        let events = s.drain_events();
        assert_eq!(events.len(), 2); // spawned + finished
        assert!(s.events().is_empty());
    }
}
