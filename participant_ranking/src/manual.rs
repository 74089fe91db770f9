/*!

This is the long-form manual for `participant_ranking` and the `fazenda` command.

## Feed format

The feed is a JSON document with a single `data` field holding the
participants, in any order:

```json
{
  "data": [
    {
      "name": "Ana",
      "picture": "images/ana.jpg",
      "description": "Professora, 34 anos",
      "positive": 100,
      "negative": "50"
    }
  ]
}
```

`name`, `picture` and `description` are displayed as given. A missing or
`null` value is displayed as an empty string.

`positive` and `negative` are the vote counts. They are normalized as
follows before anything else happens:

| raw value                          | count                       |
|------------------------------------|-----------------------------|
| missing, `null`, `false`           | 0                           |
| `true`                             | 1                           |
| zero or negative number            | 0                           |
| positive number                    | rounded to nearest integer  |
| empty or blank string              | 0                           |
| numeric string (`"12"`, `"1e3"`)   | parsed, then as a number    |
| any other string, array, object    | 0, with a warning in the log |

Any other field is kept as is. It is not displayed.

## Ranking

Participants are ordered by the chosen vote count, the highest first.
Participants with the same count appear in feed order. With the `fazenda`
command, the count is chosen with `--criterion` (`positive` by default).
An unknown criterion is not an error: a warning is logged and the feed
order is kept.

## Cards

Each participant gets one card:

| element                       | content                                    |
|-------------------------------|--------------------------------------------|
| `.participant-card`           | root `<article>`, with `data-position`     |
| `.participant-position`       | the position, starting at 1                |
| `.participant-content`        | wraps the image and the text block         |
| `img.participant-image`       | the picture, alt text `Photo of {name}`    |
| `.participant-text h2`        | the name                                   |
| `.participant-text p`         | the description                            |
| `.participant-votes .vote-positive` | `Positive: {p}%`                     |
| `.participant-votes .vote-negative` | `Negative: {n}%`                     |

`p` is the share of positive votes, rounded to the nearest percent, and
`n = 100 - p`. Both are 0 when the participant has no vote at all.

The alt text prefix and the two labels depend on the locale (`en` or
`pt`), or can be set one by one in the configuration file.

All the texts are HTML-escaped when the card is written out.

## Configuration

The `fazenda` command reads an optional JSON configuration file. Every key
is optional, and the command-line flags take precedence:

```json
{
  "feed": "data/fazenda.json",
  "template": "index.html",
  "containerClass": "participants-container",
  "criterion": "positive",
  "locale": "pt",
  "labels": { "photoPrefix": "Foto de", "positive": "Positivos", "negative": "Negativos" },
  "outputSettings": { "outputPath": "dist/index.html" },
  "server": { "root": ".", "port": 7007 }
}
```

Relative paths are resolved from the directory of the configuration file.
The feed may also be an `http://` or `https://` address.

## Commands

`fazenda render` fetches the feed, ranks it and writes the page with the
cards appended to the container. If the feed cannot be fetched, the error
is logged and the page is written without any card.

`fazenda serve` serves the static files of the site on `http://localhost:7007`.

*/
