use cadence_db::models::album::Album;
use cadence_db::models::playlist::Playlist;
use cadence_db::models::track::{CreateTrack, Track};
use cadence_db::models::user::{CreateUser, User};
use cadence_db::repositories::{AlbumRepo, PlaylistRepo, TrackRepo, UserRepo};
use chrono::NaiveDate;
use sqlx::PgPool;

pub async fn new_user(pool: &PgPool, name: &str, role: &str) -> User {
    let input = CreateUser {
        name: name.to_string(),
        email: format!("{}@test.com", name.to_lowercase().replace(' ', ".")),
        password_hash: "$argon2id$placeholder".to_string(),
        role: role.to_string(),
        status: "active".to_string(),
        birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
    };
    UserRepo::create(pool, &input).await.unwrap()
}

pub async fn new_track(pool: &PgPool, user_id: i64, name: &str) -> Track {
    let input = CreateTrack {
        user_id,
        name: name.to_string(),
        file_path: format!("tracks/{user_id}_{name}.mp3"),
    };
    TrackRepo::create(pool, &input).await.unwrap()
}

#[allow(dead_code)]
pub async fn new_album(pool: &PgPool, user_id: i64, name: &str) -> Album {
    AlbumRepo::create(pool, user_id, name).await.unwrap()
}

#[allow(dead_code)]
pub async fn new_playlist(pool: &PgPool, user_id: i64, name: &str) -> Playlist {
    PlaylistRepo::create(pool, user_id, name).await.unwrap()
}
