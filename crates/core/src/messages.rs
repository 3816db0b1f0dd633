//! User-facing (Thai) messages returned in the `message` field of responses.
//!
//! Clients display these verbatim, so they are kept in one place rather than
//! spread across handlers.

// --- Authentication ---
pub const LOGIN_REQUIRED: &str = "กรุณาเข้าสู่ระบบก่อนใช้งาน";
pub const TOKEN_INVALID: &str = "Token ไม่ถูกต้องหรือหมดอายุ";
pub const BAD_CREDENTIALS: &str = "ชื่อผู้ใช้หรือรหัสผ่านไม่ถูกต้อง";
pub const ACCOUNT_SUSPENDED: &str = "บัญชีผู้ใช้ถูกระงับการใช้งาน";
pub const LOGIN_OK: &str = "เข้าสู่ระบบสำเร็จ";
pub const LOGOUT_OK: &str = "ออกจากระบบสำเร็จ";
pub const DIRECTORY_UNAVAILABLE: &str = "ไม่สามารถเชื่อมต่อฐานข้อมูลบุคลากรได้ กรุณาลองใหม่ภายหลัง";

// --- Authorization ---
pub const SECRETARY_ONLY: &str = "คุณไม่มีสิทธิ์ในการดำเนินการนี้ (เฉพาะเจ้าหน้าที่ธุรการ)";
pub const SECRETARY_OR_MANAGER_ONLY: &str =
    "คุณไม่มีสิทธิ์ในการดำเนินการนี้ (เฉพาะเจ้าหน้าที่ธุรการและหัวหน้ากลุ่มงาน)";
pub const NOT_RESOURCE_OWNER: &str = "คุณไม่มีสิทธิ์แก้ไขข้อมูลนี้";

// --- Validation ---
pub const MISSING_FIELDS: &str = "กรุณากรอกข้อมูลที่จำเป็นให้ครบถ้วน";
pub const MEETING_NUMBER_TAKEN: &str = "เลขที่การประชุมนี้มีอยู่แล้ว";
pub const IDS_REQUIRED: &str = "กรุณาระบุ IDs ที่ต้องการลบ";
pub const INVALID_FILE_KIND: &str = "ประเภทไฟล์ไม่ถูกต้อง";
pub const INVALID_REQUEST_BODY: &str = "รูปแบบข้อมูลที่ส่งมาไม่ถูกต้อง";

// --- Uploads ---
pub const NO_FILE_UPLOADED: &str = "ไม่พบไฟล์ที่อัพโหลด";
pub const FILE_TYPE_NOT_ALLOWED: &str = "ไม่อนุญาตให้อัพโหลดไฟล์ประเภทนี้";
pub const FILE_TOO_LARGE: &str = "ไฟล์มีขนาดใหญ่เกินกำหนด";
pub const TOO_MANY_FILES: &str = "จำนวนไฟล์เกินกำหนด";
pub const UPLOAD_MALFORMED: &str = "ข้อมูลการอัพโหลดไม่ถูกต้อง";

// --- Lookup ---
pub const NOT_FOUND: &str = "ไม่พบข้อมูลที่ระบุ";
pub const MEETING_NOT_FOUND: &str = "ไม่พบการประชุมที่ระบุ";
pub const AGENDA_NOT_FOUND: &str = "ไม่พบวาระที่ระบุ";
pub const FILE_NOT_FOUND: &str = "ไม่พบไฟล์";

// --- Server ---
pub const INTERNAL_ERROR: &str = "เกิดข้อผิดพลาดภายในระบบ";
pub const CONFLICT: &str = "ข้อมูลซ้ำกับที่มีอยู่แล้ว";

// --- Success ---
pub const MEETING_CREATED: &str = "สร้างการประชุมสำเร็จ";
pub const MEETING_UPDATED: &str = "แก้ไขการประชุมสำเร็จ";
pub const MEETING_DELETED: &str = "ลบการประชุมสำเร็จ";
pub const REPORT_UPLOADED: &str = "อัพโหลดรายงานสำเร็จ";
pub const FILES_UPLOADED: &str = "อัพโหลดไฟล์สำเร็จ";
pub const AGENDA_CREATED: &str = "สร้างวาระสำเร็จ";
pub const AGENDA_UPDATED: &str = "แก้ไขวาระสำเร็จ";
pub const AGENDA_DELETED: &str = "ลบวาระสำเร็จ";
pub const FILE_DELETED: &str = "ลบไฟล์สำเร็จ";

/// Confirmation for a bulk meeting delete.
pub fn meetings_deleted(count: usize) -> String {
    format!("ลบการประชุม {count} รายการสำเร็จ")
}

/// Confirmation for a bulk agenda delete.
pub fn agendas_deleted(count: usize) -> String {
    format!("ลบวาระ {count} รายการสำเร็จ")
}
