use super::jobstack::JobStack;
use crate::errors::ChecksumError;
use crate::manifest::ChecksumManifest;
use crate::store::{ArrayStore, StoreEntry};
use crate::tree::ChecksumTree;
use log::{trace, warn};
use std::sync::Arc;
use tokio::sync::mpsc::channel;

/// Traverse & checksum an array store using a stack of jobs distributed over
/// multiple async tasks
///
/// The `workers` argument determines the number of worker tasks to spawn.
pub async fn fastasync_checksum(
    store: &ArrayStore,
    workers: usize,
) -> Result<ChecksumManifest, ChecksumError> {
    let stack = Arc::new(JobStack::new([StoreEntry::Directory(store.root())]));
    let (sender, mut receiver) = channel(64);
    for i in 0..workers {
        let stack = Arc::clone(&stack);
        let sender = sender.clone();
        tokio::spawn(async move {
            trace!("[{i}] Starting worker");
            for entry in stack.iter() {
                trace!("[{i}] Popped {:?} from stack", *entry);
                let output = match &*entry {
                    StoreEntry::Directory(d) => match d.entries_async().await {
                        Ok(children) => {
                            stack.extend(
                                children
                                    .into_iter()
                                    .inspect(|n| trace!("[{i}] Pushing {n:?} onto stack")),
                            );
                            None
                        }
                        Err(e) => Some(Err(e)),
                    },
                    StoreEntry::File(f) => Some(f.to_leaf_async().await),
                };
                if let Some(v) = output {
                    // If we've shut down, don't send anything except Errs
                    if v.is_err() || !stack.is_shutdown() {
                        if v.is_err() {
                            stack.shutdown();
                        }
                        trace!("[{i}] Sending {v:?} to output");
                        if sender.send(v).await.is_err() {
                            warn!("[{i}] Failed to send; exiting");
                            stack.shutdown();
                            return;
                        }
                    }
                }
            }
            trace!("[{i}] Ending worker");
        });
    }
    drop(sender);
    // Force the receiver to receive everything (rather than breaking out early
    // on an Err) in order to ensure that all workers run to completion
    let mut tree = ChecksumTree::new();
    let mut err: Option<ChecksumError> = None;
    while let Some(v) = receiver.recv().await {
        match v {
            Ok(leaf) => {
                if err.is_none() {
                    if let Err(e) = tree.add_leaf(leaf) {
                        stack.shutdown();
                        err = Some(e.into());
                    }
                }
            }
            Err(e) => {
                err.get_or_insert(e.into());
            }
        }
    }
    match err {
        Some(e) => Err(e),
        None => Ok(tree.into_manifest()?),
    }
}
