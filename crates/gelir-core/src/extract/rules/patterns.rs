//! Regex tables for e-SMM receipt extraction.
//!
//! Each field is driven by an explicit, ordered rule list. Order encodes
//! empirically tuned precedence against the GIB e-SMM template family:
//! labeled fields outrank bare tokens, and specific labels outrank generic
//! ones. Append new patterns at the position matching their evidence
//! strength; do not reorder without sample documents to justify it.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Document serial (GIB issuer scheme)
    pub static ref GIB_SERIAL: Regex = Regex::new(r"GIB\d+").unwrap();

    // Labeled dates, day-first. Most specific label first.
    pub static ref DATE_LABELED_DMY: Vec<Regex> = vec![
        Regex::new(r"(?i)Düzenlenme\s+Tarihi[:\s]*(\d{2})[/.\-](\d{2})[/.\-](\d{4})").unwrap(),
        Regex::new(r"(?i)Düzenleme\s+Tarihi[:\s]*(\d{2})[/.\-](\d{2})[/.\-](\d{4})").unwrap(),
        Regex::new(r"(?i)Makbuz\s+Tarihi[:\s]*(\d{2})[/.\-](\d{2})[/.\-](\d{4})").unwrap(),
        Regex::new(r"(?i)Belge\s+Tarihi[:\s]*(\d{2})[/.\-](\d{2})[/.\-](\d{4})").unwrap(),
        Regex::new(r"(?i)Tarih[:\s]*(\d{2})[/.\-](\d{2})[/.\-](\d{4})").unwrap(),
    ];

    // Bare dates, tried after every labeled rule failed.
    pub static ref DATE_BARE_DMY: Regex =
        Regex::new(r"(\d{2})[/.\-](\d{2})[/.\-](20\d{2})").unwrap();
    pub static ref DATE_BARE_YMD: Regex =
        Regex::new(r"(20\d{2})[/.\-](\d{2})[/.\-](\d{2})").unwrap();

    // Recipient block header ("ALICI BİLGİLERİ", dotted and dotless İ)
    pub static ref RECIPIENT_HEADER: Regex =
        Regex::new(r"ALICI\s*B[İI]LG[İI]LER[İI]").unwrap();

    // Lines inside the recipient block that are labels, not names
    pub static ref RECIPIENT_LABEL_LINE: Regex =
        Regex::new(r"^(Ad[ıi]|Soyad|Unvan|VKN|TCKN|Adres|Vergi|Daire)").unwrap();

    // Leading label fragments stripped from a raw client candidate
    pub static ref CLIENT_LABEL_PREFIX: Regex = Regex::new(
        r"(?i)^(BİLGİLER|BILGILER|BİLGİ|BILGI|ALICI|Alıcı|Ad[ıiI]\s*Soyad[ıiI]\s*[/\\]?\s*Unvan[ıiI]?)"
    ).unwrap();

    // A line plausibly carrying a name: at least two consecutive letters
    pub static ref HAS_LETTER_RUN: Regex =
        Regex::new(r"[a-zA-ZğüşıöçĞÜŞİÖÇ]{2,}").unwrap();

    // Labeled client-name rules, strongest evidence first.
    pub static ref CLIENT_LABELED: Vec<Regex> = vec![
        Regex::new(r"(?i)Ad[ıiI]\s*Soyad[ıiI]\s*[/\\]?\s*Unvan[ıiI]?\s*[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Ad[ıiI]\s*Soyad[ıiI]\s*[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Unvan[ıiI]?\s*[:\s]*([A-Za-zğüşıöçĞÜŞİÖÇ\s]+)").unwrap(),
        Regex::new(r"(?m)^\s*([A-Z][a-zA-Z]+\s+[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)\s*$").unwrap(),
        Regex::new(r"([A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").unwrap(),
        Regex::new(r"ALICI[:\s]*\n?\s*([A-Za-zğüşıöçĞÜŞİÖÇ][A-Za-zğüşıöçĞÜŞİÖÇ\s]{2,40})").unwrap(),
        Regex::new(r"(?i)Müşteri[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Alıcı\s*Adı[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Client[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Customer[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Bill\s*To[:\s]*([^\n\r]+)").unwrap(),
    ];

    // Last-resort capitalized word-pair scan over the whole text
    pub static ref CLIENT_NAME_SWEEP: Regex =
        Regex::new(r"(?m)^\s*([A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\s*$").unwrap();

    // Candidate rejection for labeled client matches
    pub static ref CLIENT_INVALID_START: Regex =
        Regex::new(r"(?i)^(BİLGİLER|BILGILER|ALICI|VKN|TCKN|Vergi|Adres|Tarih|\d)").unwrap();

    // Tokens that terminate a client name (street/address vocabulary)
    pub static ref ADDRESS_TOKEN: Regex = Regex::new(
        r"(?i)^(Street|St\.|Ave|Avenue|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Way|Place|Pl|Court|Ct|Chemin|Rue|Strasse|Straße|No\.|Apt|Suite|Floor|Unit)"
    ).unwrap();

    // Tokens that terminate a client name once two name words were taken
    // (country and city markers trail the name in address blocks)
    pub static ref TRAILING_GEO_TOKEN: Regex = Regex::new(
        r"(?i)^(United|USA|UK|Germany|France|Netherlands|Switzerland|Canada|Australia|Belgium|Austria|Ireland|Spain|Italy|Sweden|Norway|Denmark|Finland|Poland|Czech|Hungary|Romania|Bulgaria|Greece|Portugal|Turkey|India|China|Japan|Korea|Singapore|Hong|Dubai|UAE|Saudi|Israel|Brazil|Mexico|Argentina|Chile|Colombia|Peru)"
    ).unwrap();

    // Tax-office vocabulary that never belongs in a name
    pub static ref FISCAL_TOKEN: Regex =
        Regex::new(r"(?i)^(VKN|TCKN|Vergi|Daire|Adres)").unwrap();

    // Labeled country rules. Explicit labels first, then address tails,
    // then bare names and codes. Turkey is excluded on purpose: the
    // issuer's country appears on every GIB document.
    pub static ref COUNTRY_LABELED: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:Ülke|Ulke|Country|Nation|País|Pays|Land)[:\s]+([A-Za-zÀ-ÿ\s\-]+?)(?:\n|$|[,;])").unwrap(),
        Regex::new(r"(?i)(?:Country|Ülke|Ulke)[:\s]*\n?\s*([A-Za-zÀ-ÿ\s\-]+?)(?:\n|$)").unwrap(),
        Regex::new(r"(?im)(?:Address|Adres)[:\s]*[^\n]*\n[^\n]*\n[^\n]*?([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\s*$").unwrap(),
    ];

    pub static ref COUNTRY_FULL_NAME: Regex = Regex::new(
        r"(?i)\b(United States of America|United States|United Kingdom|USA|UK|Germany|Deutschland|France|Netherlands|Holland|Switzerland|Schweiz|Canada|Australia|Belgium|Belgique|Austria|Österreich|Ireland|Spain|España|Italy|Italia|Sweden|Sverige|Norway|Norge|Denmark|Danmark|Finland|Suomi|Poland|Polska|Czech Republic|Czechia|Hungary|Romania|Bulgaria|Greece|Portugal|India|China|Japan|South Korea|Korea|Singapore|Hong Kong|Dubai|UAE|United Arab Emirates|Saudi Arabia|Israel|Brazil|Brasil|Mexico|México|Argentina|Chile|Colombia|Peru)\b"
    ).unwrap();

    pub static ref COUNTRY_CODE: Regex = Regex::new(
        r"\b(US|GB|DE|FR|NL|CH|CA|AU|BE|AT|IE|ES|IT|SE|NO|DK|FI|PL|CZ|HU|RO|BG|GR|PT|IN|CN|JP|KR|SG|HK|AE|SA|IL|BR|MX|AR|CL|CO|PE)\b"
    ).unwrap();

    // Values a country match must not resolve to
    pub static ref COUNTRY_REJECT: Regex =
        Regex::new(r"(?i)^(bilgi|info|n/a|none|-|\.|turkey|türkiye|tr)$").unwrap();

    // Labeled USD amount rules: GIB labels first, then marketplace labels,
    // then currency-adjacent bare numbers.
    pub static ref USD_LABELED: Vec<Regex> = vec![
        Regex::new(r"(?i)Vergiler\s+Dahil\s+Toplam[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Ödenecek\s+Tutar[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Net\s+Alınan(?:\s+Toplam)?[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Toplam(?:\s+Tutar)?[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Mal\s+Hizmet\s+Toplam\s+Tutarı[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Hizmet\s+Bedeli[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Brüt\s+Ücret[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Makbuz\s+Tutarı[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Alınan\s+Ücret[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Ücret[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Bedel[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Tutar[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)Miktar[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)(?:Amount|Total|Fee|Payment|Invoice\s+Total|Grand\s+Total)[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)(?:Net|Gross)[:\s]*([\d.,\s]+)\s*USD").unwrap(),
        Regex::new(r"(?i)USD[:\s]*([\d.,\s]+)").unwrap(),
        Regex::new(r"\$[:\s]*([\d.,\s]+)").unwrap(),
        Regex::new(r"(?i)(\d+[\s.,]*\d*)\s*USD").unwrap(),
        Regex::new(r"(?i)([\d.,]+)\s*USD").unwrap(),
        Regex::new(r"([\d.,]+)\s*\$").unwrap(),
    ];

    // Labeled TRY amount rules
    pub static ref TRY_LABELED: Vec<Regex> = vec![
        Regex::new(r"(?i)Net\s+Alınan(?:\s+Toplam)?[:\s]*([\d.,]+)\s*(?:TL|TRY|₺)").unwrap(),
        Regex::new(r"(?i)Toplam(?:\s+Tutar)?[:\s]*([\d.,]+)\s*(?:TL|TRY|₺)").unwrap(),
        Regex::new(r"(\d+[.,]\d{2})\s*(?:TL|TRY|₺)").unwrap(),
        Regex::new(r"(?i)([\d.,]+)\s*(?:TL|TRY|₺)").unwrap(),
    ];

    // Description rules
    pub static ref DESCRIPTION_LABELED: Vec<Regex> = vec![
        Regex::new(r"(?i)Mal/Hizmet\s+Cinsi[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Hizmet(?:\s+Açıklaması)?[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Açıklama[:\s]*([^\n\r]+)").unwrap(),
        Regex::new(r"(?i)Description[:\s]*([^\n\r]+)").unwrap(),
    ];

    // Currency marker anchoring the windowed amount search
    pub static ref USD_MARKER: Regex = Regex::new(r"(?i)usd").unwrap();

    // Numeric tokens for the currency-window and whole-document sweeps
    pub static ref NUMBER_TOKEN: Regex = Regex::new(r"[\d.,]+").unwrap();
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(r"\d+[.,]\d{2}").unwrap();

    // Four-digit year in a folder or file name
    pub static ref YEAR_TOKEN: Regex = Regex::new(r"20\d{2}").unwrap();
}

/// Words excluded from the capitalized word-pair client sweep. Platform
/// names and country fragments show up capitalized everywhere on
/// marketplace receipts.
pub const NAME_STOPLIST: &[&str] = &[
    "Freelance", "Service", "Payment", "Invoice", "Total", "Amount", "Upwork", "Fiverr", "United",
    "States", "Kingdom",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gib_serial() {
        assert_eq!(
            GIB_SERIAL.find("Belge No: GIB2024000012345").map(|m| m.as_str()),
            Some("GIB2024000012345")
        );
    }

    #[test]
    fn test_recipient_header_variants() {
        assert!(RECIPIENT_HEADER.is_match("ALICI BİLGİLERİ"));
        assert!(RECIPIENT_HEADER.is_match("ALICI BILGILERI"));
        assert!(RECIPIENT_HEADER.is_match("ALICIBİLGİLERİ"));
    }

    #[test]
    fn test_labeled_usd_precedence() {
        let text = "Tutar: 10,00 USD\nVergiler Dahil Toplam: 1.250,00 USD";
        let caps = USD_LABELED[0].captures(text).unwrap();
        assert_eq!(caps[1].trim(), "1.250,00");
    }

    #[test]
    fn test_country_code_excludes_tr() {
        assert!(!COUNTRY_CODE.is_match("TR"));
        assert!(COUNTRY_CODE.is_match("payment from US office"));
    }

    #[test]
    fn test_date_labeled_separators() {
        let rule = &DATE_LABELED_DMY[0];
        assert!(rule.is_match("Düzenlenme Tarihi: 15/03/2024"));
        assert!(rule.is_match("Düzenlenme Tarihi: 15.03.2024"));
        assert!(rule.is_match("Düzenlenme Tarihi: 15-03-2024"));
    }
}
