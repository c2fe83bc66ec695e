use crate::sinks::{ScalarSink, ScalarSinkKind};
use candle_core::Result;
use cem_core::cross_entropy_method::{
    CrossEntropyHooks, DefaultCrossEntropyHooks, IterationReport, LearningSchedule,
};

/// Forwards `loss`, `reward_bound` and `reward_mean` of every iteration to a scalar sink, then
/// applies the default progress logging and stopping rules.
pub struct ScalarLoggingHooks {
    default_hooks: DefaultCrossEntropyHooks,
    sink: ScalarSinkKind,
}

impl ScalarLoggingHooks {
    pub fn new(learning_schedule: LearningSchedule, sink: ScalarSinkKind) -> Self {
        Self {
            default_hooks: DefaultCrossEntropyHooks::new(learning_schedule),
            sink,
        }
    }

    pub fn sink(&self) -> &ScalarSinkKind {
        &self.sink
    }
}

impl CrossEntropyHooks for ScalarLoggingHooks {
    fn init_hook(&mut self) -> bool {
        self.default_hooks.init_hook()
    }

    fn post_training_hook(&mut self, report: &IterationReport) -> Result<bool> {
        let step = report.iteration;
        self.sink.add_scalar("loss", report.loss, step);
        self.sink.add_scalar("reward_bound", report.reward_bound, step);
        self.sink.add_scalar("reward_mean", report.reward_mean, step);
        self.default_hooks.post_training_hook(report)
    }

    // flushing does not make the scalars durable; a tensorboard sink finishes writing on drop
    fn shutdown_hook(&mut self) -> Result<()> {
        self.sink.flush();
        self.default_hooks.shutdown_hook()
    }
}
