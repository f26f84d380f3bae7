//! ProfanityFilter trait 定義

/// チャット本文の不適切語マスキング
///
/// フィルタリングは配信をブロックしない（fail-open）前提のため、
/// このインターフェースは失敗しません。認可（非パートナーへの転送拒否）
/// とは独立した関心事です。
pub trait ProfanityFilter: Send + Sync {
    /// 不適切語を伏せ字にした本文を返す
    fn clean(&self, text: &str) -> String;
}
