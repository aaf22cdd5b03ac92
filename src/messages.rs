//! User-facing response texts. Status codes carry the machine-readable signal;
//! these strings are for people.

pub const INTERNAL_ERROR: &str = "Đã xảy ra lỗi trong quá trình xử lý yêu cầu";

pub const NO_MOVIES_PROVIDED: &str = "Không có phim nào được cung cấp để tạo";
pub const IMAGE_COUNT_MISMATCH: &str = "Số lượng tệp ảnh không phù hợp với số lượng phim";

pub const NO_RESULTS: &str = "Không tìm thấy kết quả";
pub const MOVIE_NOT_FOUND: &str = "Không tìm thấy phim";
pub const NOTHING_TO_DELETE: &str = "Không tìm thấy phim cần xóa";
pub const DELETED_ONE: &str = "Phim đã được xóa thành công";

pub fn invalid_movies(reason: impl std::fmt::Display) -> String {
    format!("Dữ liệu phim không hợp lệ: {reason}")
}

pub fn invalid_request(reason: impl std::fmt::Display) -> String {
    format!("Yêu cầu không hợp lệ: {reason}")
}

pub fn invalid_upload(reason: impl std::fmt::Display) -> String {
    format!("Tệp tải lên không hợp lệ: {reason}")
}

pub fn image_key_mismatch(key: &str) -> String {
    format!("Không có tệp ảnh nào khớp với khóa '{key}'")
}

pub fn image_keys_incomplete() -> String {
    "Hoặc tất cả phim đều có imageKey, hoặc không phim nào có".to_string()
}

pub fn created(count: usize) -> String {
    format!("{count} phim đã được tạo thành công!")
}

pub fn unknown_movie_id(id: &str) -> String {
    format!("Phim với id {id} không tìm thấy.")
}

pub fn no_changes(id: &str) -> String {
    format!("Không phát hiện thấy thay đổi nào đối với phim có id {id}.")
}

pub fn updated(id: &str) -> String {
    format!("Phim với id = {id} được cập nhật thành công!")
}

pub fn deleted_all(count: u64) -> String {
    format!("Tất cả {count} phim đã được xóa thành công")
}
