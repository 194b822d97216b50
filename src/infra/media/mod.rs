pub mod http_media_resolver;
