//! DTO とドメインモデルの間の変換ロジック
//!
//! クライアント入力は信用できないため、DTO → ドメインの変換は TryFrom で
//! バリデーションを通します。

use std::str::FromStr;

use crate::domain::{
    ChatType, FileBlob, InterestTags, Language, Preferences, ValidationError,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain
// ========================================

/// `findMatch` の chatType + preferences をドメインの Preferences に変換
pub fn preferences_from_dto(
    chat_type: &str,
    dto: dto::PreferencesDto,
) -> Result<Preferences, ValidationError> {
    let chat_type = ChatType::from_str(chat_type)?;
    let language = match dto.language {
        Some(value) => Some(Language::new(value)?),
        None => None,
    };
    let interests = InterestTags::new(dto.interests)?;
    Ok(Preferences::new(chat_type, language, interests))
}

impl TryFrom<dto::FileBlobDto> for FileBlob {
    type Error = ValidationError;

    fn try_from(dto: dto::FileBlobDto) -> Result<Self, Self::Error> {
        FileBlob::new(dto.name, dto.data)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<FileBlob> for dto::FileBlobDto {
    fn from(blob: FileBlob) -> Self {
        Self {
            name: blob.name().to_string(),
            data: blob.data().to_string(),
        }
    }
}
