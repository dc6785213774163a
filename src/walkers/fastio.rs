use super::jobstack::JobStack;
use crate::errors::ChecksumError;
use crate::manifest::ChecksumManifest;
use crate::store::{ArrayStore, StoreEntry};
use crate::tree::ChecksumTree;
use log::{trace, warn};
use std::num::NonZeroUsize;
use std::sync::mpsc::channel;

/// Traverse & checksum an array store using a stack of jobs distributed over
/// multiple threads
///
/// The `threads` argument determines the number of worker threads to use.
///
/// This builds an in-memory tree of all leaf records for computing the
/// final manifest.
pub fn fastio_checksum(
    store: &ArrayStore,
    threads: NonZeroUsize,
) -> Result<ChecksumManifest, ChecksumError> {
    let stack = JobStack::new([StoreEntry::Directory(store.root())]);
    let (sender, receiver) = channel();
    crossbeam_utils::thread::scope(|scope| {
        for thread_no in 0..threads.get() {
            let stack = &stack;
            let sender = sender.clone();
            scope.spawn(move |_| {
                trace!("[{thread_no}] Starting worker");
                for entry in stack.iter() {
                    trace!("[{thread_no}] Popped {:?} from stack", *entry);
                    let output = match &*entry {
                        StoreEntry::Directory(d) => match d
                            .entries()
                            .and_then(Iterator::collect::<Result<Vec<_>, _>>)
                        {
                            Ok(children) => {
                                stack.extend(children);
                                None
                            }
                            Err(e) => Some(Err(e)),
                        },
                        StoreEntry::File(f) => Some(f.to_leaf()),
                    };
                    if let Some(v) = output {
                        // If we've shut down, don't send anything except Errs
                        if v.is_err() || !stack.is_shutdown() {
                            if v.is_err() {
                                stack.shutdown();
                            }
                            if sender.send(v).is_err() {
                                warn!("[{thread_no}] Failed to send; exiting");
                                stack.shutdown();
                                return;
                            }
                        }
                    }
                }
                trace!("[{thread_no}] Ending worker");
            });
        }
        drop(sender);
        // Force the receiver to receive everything (rather than breaking out
        // early on an Err) in order to ensure that all threads run to
        // completion
        let mut tree = ChecksumTree::new();
        let mut err: Option<ChecksumError> = None;
        for v in receiver {
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
    })
    .expect("Worker threads should not panic")
}
