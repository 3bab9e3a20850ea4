pub use self::stream_source::StreamSource;

mod stream_source;
