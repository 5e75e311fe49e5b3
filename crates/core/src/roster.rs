use crate::model::{DEFAULT_CLASS_ID, LeaderboardEntry, LearnerId, NewUser, Role};

/// Login name of the class teacher created by seeding.
pub const ADMIN_USERNAME: &str = "admin";

const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_FULL_NAME: &str = "Giáo Viên Quản Trị";

const STUDENT_NAMES: [&str; 29] = [
    "Hà Tâm An",
    "Vũ Ngọc Khánh An",
    "Hoàng Diệu Anh",
    "Quàng Tuấn Anh",
    "Lê Bảo Châu",
    "Trịnh Công Dũng",
    "Bùi Nhật Duy",
    "Nguyễn Nhật Duy",
    "Nguyễn Phạm Linh Đan",
    "Nguyễn Ngọc Bảo Hân",
    "Mào Trung Hiếu",
    "Nguyễn Bá Gia Hưng",
    "Vừ Gia Hưng",
    "Vừ Thị Ngọc Linh",
    "Đỗ Phan Duy Long",
    "Vừ Thành Long",
    "Vừ Bảo Ly",
    "Quàng Thị Quốc Mai",
    "Vừ Công Minh",
    "Phạm Bảo Ngọc",
    "Lò Thảo Nguyên",
    "Trình Chân Nguyên",
    "Lò Đức Phong",
    "Thào Thị Thảo",
    "Tạ Anh Thư",
    "Lò Minh Tiến",
    "Chang Trí Tuệ",
    "Cà Phương Uyên",
    "Bùi Uyển Vy",
];

const MOCK_LEADERBOARD: [(&str, &str, u64, u32); 4] = [
    ("mock-na", "Bé Na", 1200, 15),
    ("mock-ti", "Bé Tí", 950, 12),
    ("mock-gau", "Bé Gấu", 800, 10),
    ("mock-tho", "Bé Thỏ", 600, 8),
];

/// The teacher account of the default class.
#[must_use]
pub fn admin_account() -> NewUser {
    NewUser {
        username: ADMIN_USERNAME.to_string(),
        password: ADMIN_PASSWORD.to_string(),
        full_name: ADMIN_FULL_NAME.to_string(),
        role: Some(Role::Teacher),
        class_id: Some(DEFAULT_CLASS_ID.to_string()),
    }
}

/// Students of the default class, `hs01` onwards, with empty passwords.
#[must_use]
pub fn class_roster() -> Vec<NewUser> {
    STUDENT_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| NewUser {
            username: format!("hs{:02}", idx + 1),
            password: String::new(),
            full_name: (*name).to_string(),
            role: Some(Role::Student),
            class_id: Some(DEFAULT_CLASS_ID.to_string()),
        })
        .collect()
}

/// Rows shown on an otherwise empty leaderboard.
#[must_use]
pub fn mock_leaderboard() -> Vec<LeaderboardEntry> {
    MOCK_LEADERBOARD
        .iter()
        .filter_map(|(id, name, points, lessons)| {
            Some(LeaderboardEntry {
                learner_id: LearnerId::parse(*id).ok()?,
                username: (*name).to_string(),
                points: *points,
                lessons_completed: *lessons,
            })
        })
        .collect()
}
