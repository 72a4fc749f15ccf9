use catalyst_core::{ProcessingResult, ProcessingResultCombiner};

use crate::contexts::ExportContext;

/// Every exporter stage implements this.
/// A plugin answers every context it is offered, returning `Ignored` for the ones it has no
/// business with.
pub trait ExportPlugin {
    fn name(&self) -> &'static str;

    fn process(&mut self, context: &mut ExportContext<'_>) -> ProcessingResult;
}

/// Ordered set of plugins offered every context.
#[derive(Default)]
pub struct ExportPipeline {
    plugins: Vec<Box<dyn ExportPlugin>>,
}

impl ExportPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_plugin(&mut self, plugin: impl ExportPlugin + 'static) -> &mut Self {
        log::debug!("Registered export plugin '{}'", plugin.name());
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn process(&mut self, context: &mut ExportContext<'_>) -> ProcessingResult {
        let mut combiner = ProcessingResultCombiner::new();
        for plugin in &mut self.plugins {
            let result = plugin.process(context);
            if result.is_failure() {
                log::error!(
                    "Plugin '{}' failed on {} of group '{}' during {:?}",
                    plugin.name(),
                    context.kind(),
                    context.group().name,
                    context.phase()
                );
            }
            combiner += result;
        }
        combiner.result()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use catalyst_assets::{Scene, SceneGraph};
    use catalyst_core::{MeshGroup, Phase};

    use super::*;
    use crate::contexts::GroupExportContext;

    struct Fixed(ProcessingResult);

    impl ExportPlugin for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn process(&mut self, _context: &mut ExportContext<'_>) -> ProcessingResult {
            self.0
        }
    }

    fn run(pipeline: &mut ExportPipeline) -> ProcessingResult {
        let scene = Scene::new("scene", "scene.json", SceneGraph::new());
        let group = MeshGroup::new("group");
        let mut context = ExportContext::Group(GroupExportContext {
            scene: &scene,
            group: &group,
            output_directory: Path::new("out"),
            phase: Phase::Construction,
        });
        pipeline.process(&mut context)
    }

    #[test]
    fn empty_pipeline_ignores_everything() {
        assert_eq!(run(&mut ExportPipeline::new()), ProcessingResult::Ignored);
    }

    #[test]
    fn success_outweighs_ignored() {
        let mut pipeline = ExportPipeline::new();
        pipeline
            .add_plugin(Fixed(ProcessingResult::Ignored))
            .add_plugin(Fixed(ProcessingResult::Success));
        assert_eq!(run(&mut pipeline), ProcessingResult::Success);
    }

    #[test]
    fn one_failure_fails_the_call() {
        let mut pipeline = ExportPipeline::new();
        pipeline
            .add_plugin(Fixed(ProcessingResult::Failure))
            .add_plugin(Fixed(ProcessingResult::Success));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(run(&mut pipeline), ProcessingResult::Failure);
    }
}
