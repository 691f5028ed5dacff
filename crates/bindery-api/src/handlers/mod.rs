pub mod book_access_url;
pub mod book_download;
pub mod book_get;
pub mod book_update;
pub mod book_upload;
