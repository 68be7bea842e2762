//! # Backends
//!
//! | Backend | Serves |
//! |---------|--------|
//! | [`RemoteFileService`] | any [`Transport`](crate::Transport), MVS or Unix host |
//! | [`LocalFileService`] | the local filesystem |
//! | [`MemoryHost`] | an in-memory MVS host, as a transport |

mod local;
mod memory;
mod remote;

pub use local::LocalFileService;
pub use memory::MemoryHost;
pub use remote::{HostFlavor, RemoteFileService, RemoteServiceBuilder};
