use std::sync::{mpsc, Arc};
use std::thread;

use inliner_core::{classify, Article, FeedFlags, FilterAction};
use inliner_logging::inliner_error;

use crate::pipeline::Pipeline;
use crate::{EngineEvent, JobId};

enum EngineCommand {
    Extract {
        job_id: JobId,
        url: String,
    },
    Filter {
        job_id: JobId,
        article: Article,
        flags: FeedFlags,
    },
    Action {
        job_id: JobId,
        article: Article,
        action: FilterAction,
    },
    Embed {
        job_id: JobId,
        url: String,
    },
    FullText {
        job_id: JobId,
        url: String,
        share_enabled: bool,
    },
}

impl EngineCommand {
    fn job_id(&self) -> JobId {
        match self {
            Self::Extract { job_id, .. }
            | Self::Filter { job_id, .. }
            | Self::Action { job_id, .. }
            | Self::Embed { job_id, .. }
            | Self::FullText { job_id, .. } => *job_id,
        }
    }

    fn url(&self) -> &str {
        match self {
            Self::Extract { url, .. } | Self::Embed { url, .. } | Self::FullText { url, .. } => url,
            Self::Filter { article, .. } | Self::Action { article, .. } => &article.link,
        }
    }
}

/// Runs pipeline operations on a background tokio runtime for synchronous callers.
///
/// Every job reports `Started` and then exactly one result event carrying its id.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(pipeline: Pipeline) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let pipeline = Arc::new(pipeline);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    inliner_error!("failed to start extraction runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let pipeline = pipeline.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(pipeline.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    /// Answered by `Completed`.
    pub fn enqueue(&self, job_id: JobId, url: impl Into<String>) {
        self.send(EngineCommand::Extract {
            job_id,
            url: url.into(),
        });
    }

    /// Answered by `ArticleFiltered`.
    pub fn enqueue_filter(&self, job_id: JobId, article: Article, flags: FeedFlags) {
        self.send(EngineCommand::Filter {
            job_id,
            article,
            flags,
        });
    }

    /// Answered by `ArticleFiltered`.
    pub fn enqueue_action(&self, job_id: JobId, article: Article, action: FilterAction) {
        self.send(EngineCommand::Action {
            job_id,
            article,
            action,
        });
    }

    /// Answered by `Embedded`.
    pub fn enqueue_embed(&self, job_id: JobId, url: impl Into<String>) {
        self.send(EngineCommand::Embed {
            job_id,
            url: url.into(),
        });
    }

    /// Answered by `FullText`.
    pub fn enqueue_full_text(&self, job_id: JobId, url: impl Into<String>, share_enabled: bool) {
        self.send(EngineCommand::FullText {
            job_id,
            url: url.into(),
            share_enabled,
        });
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the worker thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    pipeline: &Pipeline,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let job_id = command.job_id();
    let _ = event_tx.send(EngineEvent::Started {
        job_id,
        source: classify(command.url()),
    });

    let event = match command {
        EngineCommand::Extract { url, .. } => {
            let result = pipeline.extract(&url).await;
            EngineEvent::Completed {
                job_id,
                url,
                result,
            }
        }
        EngineCommand::Filter { article, flags, .. } => EngineEvent::ArticleFiltered {
            job_id,
            article: pipeline.filter_article(article, flags).await,
        },
        EngineCommand::Action {
            article, action, ..
        } => EngineEvent::ArticleFiltered {
            job_id,
            article: pipeline.apply_action(article, action).await,
        },
        EngineCommand::Embed { url, .. } => {
            let response = pipeline.embed(&url).await;
            EngineEvent::Embedded {
                job_id,
                url,
                response,
            }
        }
        EngineCommand::FullText {
            url, share_enabled, ..
        } => {
            let content = pipeline.full_text(&url, share_enabled).await;
            EngineEvent::FullText {
                job_id,
                url,
                content,
            }
        }
    };
    let _ = event_tx.send(event);
}
