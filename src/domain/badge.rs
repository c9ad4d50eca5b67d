use super::text_enum;

text_enum! {
    pub enum BadgeRarity("rarity") {
        Common => "common",
        Rare => "rare",
        Epic => "epic",
        Legendary => "legendary",
    }
}
