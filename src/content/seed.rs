use super::affirmations::AffirmationCategory::{self, Confidence, Love, Peace, Strength};

/// Starter affirmations written by the seeding binary into an empty database.
pub const SEED_AFFIRMATIONS: [(&str, AffirmationCategory); 25] = [
    ("You are enough, mama. Your body is doing miraculous work.", Confidence),
    ("Trust your instincts - you already know how to be a wonderful mother.", Confidence),
    ("You are exactly where you need to be in this moment of your journey.", Confidence),
    ("Your body knows how to grow and birth your baby perfectly.", Confidence),
    ("You are brave, capable, and ready for this beautiful challenge.", Confidence),
    ("Each day, you grow stronger and more prepared for motherhood.", Strength),
    ("You have the inner strength to handle whatever comes your way.", Strength),
    ("Your resilience is powerful and will carry you through this journey.", Strength),
    ("You are creating life with grace and determination.", Strength),
    ("Every challenge makes you stronger and more prepared.", Strength),
    ("Your love for your baby is already infinite and beautiful.", Love),
    ("You and your baby are connected by an unbreakable bond of love.", Love),
    ("Your heart is expanding with more love than you ever imagined possible.", Love),
    ("You are surrounded by love and support on this journey.", Love),
    ("Your baby is already so loved and wanted.", Love),
    ("Take a deep breath. You and your baby are safe and loved.", Peace),
    ("Peace flows through you and surrounds your growing baby.", Peace),
    ("You release all worries and embrace the present moment.", Peace),
    ("Calm and serenity fill your mind, body, and spirit.", Peace),
    ("You trust in the natural process of pregnancy and birth.", Peace),
    ("Your body is wise and knows exactly what to do.", Confidence),
    ("You are creating a miracle with every breath you take.", Strength),
    ("Your baby feels your love and excitement already.", Love),
    ("Rest when you need to. Your body is working hard for you.", Peace),
    ("You are becoming the mother your baby needs.", Confidence),
];
