pub mod blob_sink;
pub mod streaming_downloader;

pub use blob_sink::{BlobSink, DialogSink, DirectorySink};
pub use streaming_downloader::{
    CancelHandle, StreamingDownloader, Transfer, TransferEvent, TransferObserver,
};
